//! HTTP client for the Wufoo v3 REST API
//!
//! - Request building for the `fields` and `entries` endpoints
//! - HTTP basic authentication with the account API key
//! - Error classification for non-success responses

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{WufooAuth, API_KEY_ENV};
pub use client::{WufooClient, WufooClientConfig, SUBDOMAIN_ENV};
pub use error::{ErrorClassification, HttpError};

// Re-export commonly used types
pub use reqwest::StatusCode;
