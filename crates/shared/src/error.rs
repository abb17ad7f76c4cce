use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error payload produced by the backend services' exception handlers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: HashMap<String, serde_json::Value>,
}

impl ApiError {
    /// Pull the human readable message out of a raw response body.
    ///
    /// Backends answer either with an [`ApiError`] object, a JSON string, or
    /// plain text. Empty bodies carry no message.
    pub fn message_from_body(body: &str) -> Option<String> {
        let body = body.trim();
        if body.is_empty() {
            return None;
        }
        if let Ok(parsed) = serde_json::from_str::<ApiError>(body) {
            return parsed.message.or(parsed.error);
        }
        if let Ok(text) = serde_json::from_str::<String>(body) {
            return Some(text);
        }
        if body.starts_with('{') || body.starts_with('[') {
            return None;
        }
        Some(body.to_string())
    }
}

/// Client-side rejection of a form before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be a positive integer, got '{value}'")]
    NotPositiveInteger { field: &'static str, value: String },
    #[error("{field} is not a calendar date: '{value}'")]
    InvalidDate { field: &'static str, value: String },
}
