//! Vote ledger client.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{CandidateId, Vote},
    protocol::SubmitVoteRequest,
};
use tracing::info;

use crate::{error::GatewayError, transport::HttpTransport};

pub const SERVICE: &str = "vote ledger";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8083/api";

#[async_trait]
pub trait VoteLedger: Send + Sync {
    async fn list_votes(&self) -> Result<Vec<Vote>, GatewayError>;
    async fn submit_vote(&self, request: SubmitVoteRequest) -> Result<Vote, GatewayError>;
    async fn votes_for_candidate(&self, candidate_id: CandidateId)
        -> Result<Vec<Vote>, GatewayError>;
}

pub struct HttpVoteLedger {
    transport: HttpTransport,
}

impl HttpVoteLedger {
    pub fn new(http: Client, base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            transport: HttpTransport::new(http, SERVICE, base_url)?,
        })
    }
}

#[async_trait]
impl VoteLedger for HttpVoteLedger {
    async fn list_votes(&self) -> Result<Vec<Vote>, GatewayError> {
        self.transport.get_json(&["votes"]).await
    }

    async fn submit_vote(&self, request: SubmitVoteRequest) -> Result<Vote, GatewayError> {
        let vote: Vote = self.transport.post_json(&["votes"], &request).await?;
        info!(
            vote_id = %vote.id,
            elector_id = %request.elector_id,
            candidate_id = %request.candidate_id,
            "vote recorded"
        );
        Ok(vote)
    }

    async fn votes_for_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<Vote>, GatewayError> {
        self.transport
            .get_json(&["votes", "candidate", &candidate_id.to_string()])
            .await
    }
}
