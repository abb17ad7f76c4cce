use std::{collections::HashMap, sync::Arc};

use shared::{
    domain::{CandidateId, Elector, ElectorId, Vote},
    error::ValidationError,
    protocol::SubmitVoteRequest,
};
use tracing::warn;

use super::{describe_failure, FailureContext, PanelEvent, PanelStatus, UpdateNotifier};
use crate::{error::GatewayError, ledger::VoteLedger, registry::ElectorRegistry};

pub struct VotesController {
    ledger: Arc<dyn VoteLedger>,
    registry: Arc<dyn ElectorRegistry>,
    notifier: UpdateNotifier,
    votes: Vec<Vote>,
    electors: Vec<Elector>,
    // Rendering only; rebuilt on every load.
    names: HashMap<ElectorId, String>,
    status: PanelStatus,
}

impl VotesController {
    pub fn new(
        ledger: Arc<dyn VoteLedger>,
        registry: Arc<dyn ElectorRegistry>,
        notifier: UpdateNotifier,
    ) -> Self {
        Self {
            ledger,
            registry,
            notifier,
            votes: Vec::new(),
            electors: Vec::new(),
            names: HashMap::new(),
            status: PanelStatus::Idle,
        }
    }

    pub async fn mount(
        ledger: Arc<dyn VoteLedger>,
        registry: Arc<dyn ElectorRegistry>,
        notifier: UpdateNotifier,
    ) -> Self {
        let mut controller = Self::new(ledger, registry, notifier);
        controller.load().await;
        controller
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    /// Electors offered for submission: those who had not voted when the
    /// panel last loaded. Not re-checked at submit time.
    pub fn eligible_electors(&self) -> impl Iterator<Item = &Elector> {
        self.electors.iter().filter(|elector| !elector.has_voted)
    }

    pub fn elector_name(&self, elector_id: ElectorId) -> String {
        self.names
            .get(&elector_id)
            .cloned()
            .unwrap_or_else(|| format!("ID: {elector_id}"))
    }

    /// Loads votes and electors concurrently and waits for both to settle.
    pub async fn load(&mut self) {
        self.status = PanelStatus::Loading;
        let (votes, electors) =
            futures::join!(self.ledger.list_votes(), self.registry.list_electors());

        match (votes, electors) {
            (Ok(votes), Ok(electors)) => {
                self.names = electors
                    .iter()
                    .map(|elector| (elector.id, elector.display_name()))
                    .collect();
                self.votes = votes;
                self.electors = electors;
                self.status = PanelStatus::Ready;
            }
            (Err(err), _) | (_, Err(err)) => self.fail(FailureContext::LoadVotes, &err),
        }
    }

    /// Both ids must be positive integers; nothing is sent otherwise.
    pub async fn submit_vote(&mut self, elector_id: &str, candidate_id: &str) -> Option<Vote> {
        let request = match parse_vote(elector_id, candidate_id) {
            Ok(request) => request,
            Err(err) => {
                self.fail(FailureContext::SubmitVote, &GatewayError::from(err));
                return None;
            }
        };

        match self.ledger.submit_vote(request).await {
            Ok(vote) => {
                self.load().await;
                self.notifier.notify(PanelEvent::VoteSubmitted);
                Some(vote)
            }
            Err(err) => {
                self.fail(FailureContext::SubmitVote, &err);
                None
            }
        }
    }

    fn fail(&mut self, context: FailureContext, err: &GatewayError) {
        warn!(?context, "votes panel: {err}");
        self.status = PanelStatus::Error(describe_failure(context, err));
    }
}

pub fn parse_vote(elector_id: &str, candidate_id: &str) -> Result<SubmitVoteRequest, ValidationError> {
    Ok(SubmitVoteRequest {
        elector_id: ElectorId(parse_positive_id("elector id", elector_id)?),
        candidate_id: CandidateId(parse_positive_id("candidate id", candidate_id)?),
    })
}

fn parse_positive_id(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    match trimmed.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ValidationError::NotPositiveInteger {
            field,
            value: trimmed.to_string(),
        }),
    }
}
