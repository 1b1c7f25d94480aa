//! Wufoo API client
//!
//! Talks to `https://{subdomain}.wufoo.com/api/v3/`:
//! - `GET forms/{form}/fields.json` for the field descriptors
//! - `POST forms/{form}/entries.json` with a form-urlencoded body for entries

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::http::{HttpError, WufooAuth};
use crate::remote::FormClient;
use crate::response::{parse_entry_response, parse_fields_response, EntryResponse};
use crate::types::{form_value, FormFieldDescriptor, OutgoingPayload};
use crate::{Error, Result};

/// Environment variable holding the account subdomain
pub const SUBDOMAIN_ENV: &str = "WUFOO_SUBDOMAIN";

/// Configuration for the Wufoo client
#[derive(Debug, Clone)]
pub struct WufooClientConfig {
    /// Account subdomain (`{subdomain}.wufoo.com`)
    pub subdomain: String,
    /// Full API base URL; overrides the one derived from the subdomain
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
}

impl Default for WufooClientConfig {
    fn default() -> Self {
        Self {
            subdomain: String::new(),
            base_url: None,
            timeout_secs: 30,
            validate_tls: true,
        }
    }
}

impl WufooClientConfig {
    /// Config for an account subdomain with default settings
    pub fn for_subdomain(subdomain: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            ..Default::default()
        }
    }

    /// Set an explicit API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// The API base URL, always ending in `/`
    pub fn api_base(&self) -> Result<Url> {
        let raw = match &self.base_url {
            Some(base) => base.clone(),
            None => {
                let subdomain = self.subdomain.trim();
                if subdomain.is_empty() {
                    return Err(Error::configuration(format!(
                        "Wufoo subdomain not configured. Set {} or configure a subdomain",
                        SUBDOMAIN_ENV
                    )));
                }
                format!("https://{}.wufoo.com/api/v3/", subdomain)
            }
        };

        let raw = if raw.ends_with('/') { raw } else { format!("{}/", raw) };
        Url::parse(&raw).map_err(|e| Error::Configuration {
            message: format!("Invalid Wufoo API base URL '{}': {}", raw, e),
            source: Some(e.into()),
        })
    }
}

/// HTTP client for one Wufoo account
pub struct WufooClient {
    /// Underlying reqwest client
    client: ReqwestClient,
    /// API base URL
    base_url: Url,
    /// Authentication
    auth: WufooAuth,
    /// Client configuration
    config: WufooClientConfig,
}

impl WufooClient {
    /// Create a new client
    pub fn new(config: WufooClientConfig, auth: WufooAuth) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.validate_tls)
            .user_agent(concat!("wufoo-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::HttpRequest {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        let base_url = config.api_base()?;

        Ok(Self {
            client,
            base_url,
            auth,
            config,
        })
    }

    /// Create from `WUFOO_SUBDOMAIN` and `WUFOO_API_KEY`
    pub fn from_env() -> Result<Self> {
        let subdomain = std::env::var(SUBDOMAIN_ENV).unwrap_or_default();
        Self::new(WufooClientConfig::for_subdomain(subdomain), WufooAuth::from_env())
    }

    /// Validate that the client is properly configured
    pub fn validate(&self) -> Result<()> {
        self.auth.validate_credentials()
    }

    /// Get a reference to the client configuration
    pub fn config(&self) -> &WufooClientConfig {
        &self.config
    }

    /// The resolved API base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/forms/{form}/{leaf}`, with the form id percent-encoded
    fn form_endpoint(&self, form: &str, leaf: &str) -> Result<Url> {
        if form.trim().is_empty() {
            return Err(Error::configuration("Form identifier is empty"));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::configuration(format!("API base URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["forms", form, leaf]);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let request = self.auth.apply(request)?;
        request
            .send()
            .await
            .map_err(|e| HttpError::from_request_error(e).into())
    }

    async fn read_body(response: Response) -> Result<(reqwest::StatusCode, String)> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(HttpError::from_request_error)?;
        Ok((status, body))
    }
}

#[async_trait]
impl FormClient for WufooClient {
    #[instrument(skip(self), fields(form = %form))]
    async fn find_fields(&self, form: &str) -> Result<Vec<FormFieldDescriptor>> {
        let url = self.form_endpoint(form, "fields.json")?;
        debug!(url = %url, "Fetching form fields");

        let response = self.send(self.client.get(url)).await?;
        let (status, body) = Self::read_body(response).await?;

        if !status.is_success() {
            return Err(HttpError::from_status(status, &body).into());
        }

        let json: Value = serde_json::from_str(&body)?;
        let fields = parse_fields_response(json)?;
        debug!(count = fields.len(), "Fetched form fields");
        Ok(fields)
    }

    #[instrument(skip(self, payload), fields(form = %form, fields = payload.len()))]
    async fn save_entry(&self, form: &str, payload: &OutgoingPayload) -> Result<EntryResponse> {
        let url = self.form_endpoint(form, "entries.json")?;
        let body: Vec<(&str, String)> = payload
            .iter()
            .map(|(id, value)| (id.as_str(), form_value(value)))
            .collect();
        debug!(url = %url, "Submitting entry");

        let response = self.send(self.client.post(url).form(&body)).await?;
        let (status, text) = Self::read_body(response).await?;

        if status.is_success() {
            let json: Value = serde_json::from_str(&text)?;
            return parse_entry_response(json);
        }

        // Validation failures may come back with a 4xx status but a regular
        // entries body; those are rejections, not transport errors.
        if status.is_client_error() {
            if let Ok(json) = serde_json::from_str::<Value>(&text) {
                let is_entry_body = json.get("FieldErrors").is_some()
                    || json.get("Success").is_some()
                    || json.get("PostResponse").is_some();
                if is_entry_body {
                    return parse_entry_response(json);
                }
            }
        }

        Err(HttpError::from_status(status, &text).into())
    }
}
