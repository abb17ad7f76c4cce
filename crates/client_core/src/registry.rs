//! Elector registry client.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Elector, ElectorId},
    protocol::CreateElectorRequest,
};
use tracing::info;

use crate::{error::GatewayError, transport::HttpTransport};

pub const SERVICE: &str = "elector registry";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api";

#[async_trait]
pub trait ElectorRegistry: Send + Sync {
    async fn list_electors(&self) -> Result<Vec<Elector>, GatewayError>;
    async fn get_elector(&self, id: ElectorId) -> Result<Elector, GatewayError>;
    async fn create_elector(&self, request: &CreateElectorRequest)
        -> Result<Elector, GatewayError>;
    async fn find_by_identifier(&self, secure_identifier: &str) -> Result<Elector, GatewayError>;
}

pub struct HttpElectorRegistry {
    transport: HttpTransport,
}

impl HttpElectorRegistry {
    pub fn new(http: Client, base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            transport: HttpTransport::new(http, SERVICE, base_url)?,
        })
    }
}

#[async_trait]
impl ElectorRegistry for HttpElectorRegistry {
    async fn list_electors(&self) -> Result<Vec<Elector>, GatewayError> {
        self.transport.get_json(&["electors"]).await
    }

    async fn get_elector(&self, id: ElectorId) -> Result<Elector, GatewayError> {
        self.transport
            .get_json(&["electors", &id.to_string()])
            .await
    }

    async fn create_elector(
        &self,
        request: &CreateElectorRequest,
    ) -> Result<Elector, GatewayError> {
        let elector: Elector = self.transport.post_json(&["electors"], request).await?;
        info!(elector_id = %elector.id, "elector registered");
        Ok(elector)
    }

    async fn find_by_identifier(&self, secure_identifier: &str) -> Result<Elector, GatewayError> {
        self.transport
            .get_json(&["electors", "identifiant", secure_identifier])
            .await
    }
}
