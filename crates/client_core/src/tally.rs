//! Result tally client.

use async_trait::async_trait;
use reqwest::Client;
use shared::domain::{CandidateResult, Statistics};
use tracing::info;

use crate::{error::GatewayError, transport::HttpTransport};

pub const SERVICE: &str = "result tally";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8082/api";

#[async_trait]
pub trait ResultTally: Send + Sync {
    async fn list_results(&self) -> Result<Vec<CandidateResult>, GatewayError>;
    async fn statistics(&self) -> Result<Statistics, GatewayError>;
    async fn publish(&self) -> Result<(), GatewayError>;
    /// Asks the tally to recount from the vote ledger.
    async fn calculate(&self) -> Result<(), GatewayError>;
}

pub struct HttpResultTally {
    transport: HttpTransport,
}

impl HttpResultTally {
    pub fn new(http: Client, base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            transport: HttpTransport::new(http, SERVICE, base_url)?,
        })
    }
}

#[async_trait]
impl ResultTally for HttpResultTally {
    async fn list_results(&self) -> Result<Vec<CandidateResult>, GatewayError> {
        self.transport.get_json(&["results"]).await
    }

    async fn statistics(&self) -> Result<Statistics, GatewayError> {
        self.transport.get_json(&["results", "statistics"]).await
    }

    async fn publish(&self) -> Result<(), GatewayError> {
        self.transport.post_empty(&["results", "publish"]).await?;
        info!("results published");
        Ok(())
    }

    async fn calculate(&self) -> Result<(), GatewayError> {
        self.transport.post_empty(&["results", "calculate"]).await?;
        info!("results recalculated");
        Ok(())
    }
}
