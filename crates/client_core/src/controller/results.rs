use std::sync::Arc;

use shared::domain::{CandidateId, CandidateResult, Statistics};
use tracing::{debug, warn};

use super::{describe_failure, FailureContext, PanelEvent, PanelStatus, UpdateNotifier};
use crate::{error::GatewayError, tally::ResultTally};

/// One candidate line of the results panel, with its derived display values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub candidate_id: CandidateId,
    pub candidate_name: Option<String>,
    pub votes: i64,
    /// Share of all votes, 0..=100. Zero when nobody voted.
    pub percentage: f64,
    /// Length relative to the leading candidate, 0..=1.
    pub bar_scale: f64,
    /// Whether the grand total across all candidates is above zero.
    pub any_votes: bool,
}

impl ResultRow {
    /// `0` while nobody has voted, otherwise one decimal (`0.0` included).
    pub fn percentage_label(&self) -> String {
        if !self.any_votes {
            "0".to_string()
        } else {
            format!("{:.1}", self.percentage)
        }
    }
}

pub fn total_votes(results: &[CandidateResult]) -> i64 {
    results.iter().map(|result| result.total_votes).sum()
}

pub fn percentage(votes: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    votes as f64 / total as f64 * 100.0
}

pub fn bar_scale(votes: i64, max_votes: i64) -> f64 {
    votes as f64 / max_votes.max(1) as f64
}

pub fn result_rows(results: &[CandidateResult]) -> Vec<ResultRow> {
    let total = total_votes(results);
    let max_votes = results
        .iter()
        .map(|result| result.total_votes)
        .max()
        .unwrap_or_default();

    results
        .iter()
        .map(|result| ResultRow {
            candidate_id: result.candidate_id,
            candidate_name: result.candidate_name.clone(),
            votes: result.total_votes,
            percentage: percentage(result.total_votes, total),
            bar_scale: bar_scale(result.total_votes, max_votes),
            any_votes: total > 0,
        })
        .collect()
}

/// `12.5%`, or `N/A` when the tally did not report a rate.
pub fn participation_label(statistics: &Statistics) -> String {
    match statistics.participation_rate {
        Some(rate) if rate != 0.0 => format!("{rate:.1}%"),
        _ => "N/A".to_string(),
    }
}

pub struct ResultsController {
    tally: Arc<dyn ResultTally>,
    notifier: UpdateNotifier,
    results: Vec<CandidateResult>,
    statistics: Option<Statistics>,
    status: PanelStatus,
}

impl ResultsController {
    pub fn new(tally: Arc<dyn ResultTally>, notifier: UpdateNotifier) -> Self {
        Self {
            tally,
            notifier,
            results: Vec::new(),
            statistics: None,
            status: PanelStatus::Idle,
        }
    }

    pub async fn mount(tally: Arc<dyn ResultTally>, notifier: UpdateNotifier) -> Self {
        let mut controller = Self::new(tally, notifier);
        controller.load().await;
        controller
    }

    pub fn results(&self) -> &[CandidateResult] {
        &self.results
    }

    /// `None` is a valid state: the tally may not serve statistics.
    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    pub fn rows(&self) -> Vec<ResultRow> {
        result_rows(&self.results)
    }

    pub fn total_votes(&self) -> i64 {
        total_votes(&self.results)
    }

    /// Results are required; statistics are best effort and their failure
    /// only empties the statistics block.
    pub async fn load(&mut self) {
        self.status = PanelStatus::Loading;
        let (results, statistics) =
            futures::join!(self.tally.list_results(), self.tally.statistics());

        match results {
            Ok(results) => {
                self.results = results;
                self.statistics = match statistics {
                    Ok(statistics) => Some(statistics),
                    Err(err) => {
                        debug!("statistics unavailable: {err}");
                        None
                    }
                };
                self.status = PanelStatus::Ready;
            }
            Err(err) => self.fail(FailureContext::LoadResults, &err),
        }
    }

    /// Publishing cannot be undone here; a failure only sets the banner.
    pub async fn publish(&mut self) -> bool {
        match self.tally.publish().await {
            Ok(()) => {
                self.load().await;
                self.notifier.notify(PanelEvent::ResultsPublished);
                true
            }
            Err(err) => {
                self.fail(FailureContext::PublishResults, &err);
                false
            }
        }
    }

    fn fail(&mut self, context: FailureContext, err: &GatewayError) {
        warn!(?context, "results panel: {err}");
        self.status = PanelStatus::Error(describe_failure(context, err));
    }
}
