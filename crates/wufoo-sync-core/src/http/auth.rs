//! Authentication for the Wufoo API
//!
//! Wufoo uses HTTP basic auth with the account API key as the user name.
//! The password is ignored by the service; by convention it is `footastic`.

use std::fmt;

use reqwest::RequestBuilder;

use crate::Result;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "WUFOO_API_KEY";

/// Password sent alongside the API key
const BASIC_AUTH_PASSWORD: &str = "footastic";

/// API-key credentials for one Wufoo account
#[derive(Clone, Default)]
pub struct WufooAuth {
    api_key: Option<String>,
}

impl WufooAuth {
    /// Create with explicit API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    /// Create from the `WUFOO_API_KEY` environment variable
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
        }
    }

    /// Prefer an explicit key, fall back to the environment
    pub fn from_option(api_key: Option<String>) -> Self {
        match api_key.filter(|k| !k.is_empty()) {
            Some(key) => Self::new(key),
            None => Self::from_env(),
        }
    }

    /// Apply authentication to a request
    pub fn apply(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let key = self.api_key()?;
        Ok(request.basic_auth(key, Some(BASIC_AUTH_PASSWORD)))
    }

    /// Validate that required credentials are available
    pub fn validate_credentials(&self) -> Result<()> {
        self.api_key().map(|_| ())
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            crate::Error::configuration(format!(
                "Wufoo API key not found. Set {} or configure an api_key",
                API_KEY_ENV
            ))
        })
    }
}

impl fmt::Debug for WufooAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WufooAuth")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}
