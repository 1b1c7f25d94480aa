//! HTTP error classification and normalization
//!
//! Wufoo reports API-level failures as `{"HTTPCode": 404, "Text": "...", "Link": "..."}`.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Classification of HTTP errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClassification {
    /// Client errors (4xx)
    ClientError,
    /// Server errors (5xx)
    ServerError,
    /// Network errors
    NetworkError,
    /// Rate limiting
    RateLimitError,
    /// Authentication errors
    AuthenticationError,
    /// Unknown errors
    Unknown,
}

impl ErrorClassification {
    /// Whether repeating the same request later could succeed
    ///
    /// The save flow never retries on its own; callers may use this to
    /// decide whether to queue the record for another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorClassification::ServerError
                | ErrorClassification::NetworkError
                | ErrorClassification::RateLimitError
        )
    }
}

/// Normalized HTTP error representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpError {
    /// HTTP status code if available
    pub status_code: Option<u16>,
    /// Error classification
    pub classification: ErrorClassification,
    /// Human-readable error message
    pub message: String,
    /// Parsed JSON body, if the body was JSON
    pub details: Option<Value>,
}

impl HttpError {
    /// Create from a non-success status and the raw response body
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let details = serde_json::from_str::<Value>(body).ok();
        let message = Self::extract_message(&details, body, status);

        Self {
            status_code: Some(status.as_u16()),
            classification: Self::classify_status(status),
            message,
            details,
        }
    }

    /// Create from a network/request error
    pub fn from_request_error(error: reqwest::Error) -> Self {
        let classification = if error.is_timeout() || error.is_connect() {
            ErrorClassification::NetworkError
        } else {
            ErrorClassification::Unknown
        };

        Self {
            status_code: error.status().map(|s| s.as_u16()),
            classification,
            message: error.to_string(),
            details: None,
        }
    }

    /// Classify HTTP status code
    fn classify_status(status: StatusCode) -> ErrorClassification {
        match status.as_u16() {
            401 | 403 => ErrorClassification::AuthenticationError,
            429 => ErrorClassification::RateLimitError,
            400..=499 => ErrorClassification::ClientError,
            500..=599 => ErrorClassification::ServerError,
            _ => ErrorClassification::Unknown,
        }
    }

    /// Pull the error text out of a Wufoo error body
    fn extract_message(details: &Option<Value>, body: &str, status: StatusCode) -> String {
        if let Some(json) = details {
            if let Some(text) = json.get("Text").and_then(|t| t.as_str()) {
                return text.to_string();
            }
            if let Some(text) = json.get("ErrorText").and_then(|t| t.as_str()) {
                return text.to_string();
            }
        }

        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Get the error classification
    pub fn classification(&self) -> ErrorClassification {
        self.classification
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP Error [{}]: {} (classification: {:?})",
            self.status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.message,
            self.classification
        )
    }
}

impl std::error::Error for HttpError {}

/// Convert HttpError to crate Error
impl From<HttpError> for crate::Error {
    fn from(http_error: HttpError) -> Self {
        crate::Error::Http {
            message: http_error.message.clone(),
            status_code: http_error.status_code,
            source: Some(anyhow::Error::new(http_error)),
        }
    }
}
