use shared::error::ValidationError;
use thiserror::Error;

/// Failure of a single backend call, split by what the caller can tell the
/// operator about it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No response came back: the service is down, unroutable or timed out.
    #[error("{service} unreachable at {base_url}: {detail}")]
    NetworkUnreachable {
        service: &'static str,
        base_url: String,
        detail: String,
    },
    /// A response arrived with a non-success status.
    #[error("{service} answered HTTP {status}: {}", .message.as_deref().unwrap_or("no details"))]
    ServerError {
        service: &'static str,
        status: u16,
        message: Option<String>,
    },
    #[error("{message}")]
    Unknown { message: String },
}

impl GatewayError {
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    pub(crate) fn from_reqwest(service: &'static str, base_url: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::ServerError {
                service,
                status: status.as_u16(),
                message: None,
            };
        }
        if err.is_connect() || err.is_timeout() || err.is_request() {
            return Self::NetworkUnreachable {
                service,
                base_url: base_url.to_string(),
                detail: err.to_string(),
            };
        }
        Self::Unknown {
            message: format!("{service} request failed: {err}"),
        }
    }

    pub fn is_network_unreachable(&self) -> bool {
        matches!(self, Self::NetworkUnreachable { .. })
    }
}

impl From<ValidationError> for GatewayError {
    fn from(value: ValidationError) -> Self {
        Self::Unknown {
            message: value.to_string(),
        }
    }
}
