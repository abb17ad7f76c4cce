//! JSON-over-HTTP plumbing shared by the three backend clients.

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::ApiError;
use tracing::debug;
use url::Url;

use crate::error::GatewayError;

/// One backend service reachable under a fixed base URL.
///
/// No retries, caching or explicit timeout: every call either resolves with
/// data or fails with a categorized [`GatewayError`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    service: &'static str,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(http: Client, service: &'static str, base_url: &str) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|err| {
            GatewayError::unknown(format!("invalid {service} base url '{base_url}': {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::unknown(format!(
                "{service} base url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            http,
            service,
            base_url,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get_json<T>(&self, segments: &[&str]) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let res = self.send(self.http.get(self.url(segments))).await?;
        self.decode(res).await
    }

    pub async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let res = self
            .send(self.http.post(self.url(segments)).json(body))
            .await?;
        self.decode(res).await
    }

    /// POST without a body; whatever the service answers is discarded.
    pub async fn post_empty(&self, segments: &[&str]) -> Result<(), GatewayError> {
        self.send(self.http.post(self.url(segments))).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let res = request
            .send()
            .await
            .map_err(|err| GatewayError::from_reqwest(self.service, self.base_url(), err))?;
        let status = res.status();
        debug!(service = self.service, url = %res.url(), %status, "backend call settled");
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        Err(GatewayError::ServerError {
            service: self.service,
            status: status.as_u16(),
            message: ApiError::message_from_body(&body),
        })
    }

    async fn decode<T>(&self, res: Response) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let bytes = res
            .bytes()
            .await
            .map_err(|err| GatewayError::from_reqwest(self.service, self.base_url(), err))?;
        serde_json::from_slice(&bytes).map_err(|err| {
            GatewayError::unknown(format!("malformed response from {}: {err}", self.service))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_each_segment() {
        let transport =
            HttpTransport::new(Client::new(), "elector registry", "http://localhost:8081/api/")
                .expect("transport");
        assert_eq!(transport.base_url(), "http://localhost:8081/api");
        assert_eq!(
            transport
                .url(&["electors", "identifiant", "A B/7"])
                .as_str(),
            "http://localhost:8081/api/electors/identifiant/A%20B%2F7"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = HttpTransport::new(Client::new(), "vote ledger", "not a url")
            .expect_err("must reject");
        assert!(matches!(err, GatewayError::Unknown { .. }));
    }
}
