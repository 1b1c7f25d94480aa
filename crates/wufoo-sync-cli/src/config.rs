//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML, JSON or TOML, chosen by extension)
//! - Environment variables (`WUFOO_SUBDOMAIN`, `WUFOO_API_KEY`)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use wufoo_sync_core::http::{API_KEY_ENV, SUBDOMAIN_ENV};
use wufoo_sync_core::{
    EntrySettings, EntrySync, FieldReconciler, FormClient, WufooAuth, WufooClient,
    WufooClientConfig,
};

const REDACTED: &str = "***";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account the forms live under
    pub account: AccountConfig,

    /// Field matching settings
    pub matching: MatchingConfig,

    /// Per-model settings, keyed by model alias
    pub models: BTreeMap<String, EntrySettings>,
}

/// Wufoo account settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Account subdomain (`{subdomain}.wufoo.com`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,

    /// API key for the account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Timeout in seconds
    pub timeout: u64,
}

/// Field matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Try `"{field} {value}"` when neither the name nor its humanized form matches
    pub composite: bool,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            subdomain: None,
            api_key: None,
            base_url: None,
            timeout: 30,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { composite: true }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config = match extension(path) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content).map_err(|e| {
                Error::config(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            _ => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to load config");
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations, then
    /// apply environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) if !path.exists() => {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Overlay account values found through `lookup`; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(subdomain) = value(SUBDOMAIN_ENV) {
            self.account.subdomain = Some(subdomain);
        }
        if let Some(api_key) = value(API_KEY_ENV) {
            self.account.api_key = Some(api_key);
        }
    }

    /// Configuration file paths checked, in order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            // Current directory
            PathBuf::from(".wufoo-sync.yaml"),
            PathBuf::from(".wufoo-sync.json"),
            PathBuf::from("wufoo-sync.yaml"),
            PathBuf::from("wufoo-sync.json"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("wufoo-sync");
            paths.push(app_dir.join("config.yaml"));
            paths.push(app_dir.join("config.json"));
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".wufoo-sync.yaml"));
            paths.push(home_dir.join(".wufoo-sync.json"));
        }

        paths
    }

    /// The file `load` would read, if any exists
    pub fn find_config_file() -> Option<PathBuf> {
        Self::default_config_paths().into_iter().find(|p| p.exists())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path) {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
            _ => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Starter configuration written by `config init`
    pub fn starter() -> Self {
        let mut config = Self::default();
        config.account.subdomain = Some("your-subdomain".to_string());
        config
            .models
            .insert("Contact".to_string(), EntrySettings::new("contact-us"));
        config
    }

    /// Copy of the configuration safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.account.api_key.is_some() {
            config.account.api_key = Some(REDACTED.to_string());
        }
        config
    }

    /// Client settings for the configured account
    pub fn client_config(&self) -> WufooClientConfig {
        let mut client_config =
            WufooClientConfig::for_subdomain(self.account.subdomain.clone().unwrap_or_default())
                .with_timeout(self.account.timeout);
        if let Some(base_url) = &self.account.base_url {
            client_config = client_config.with_base_url(base_url.clone());
        }
        client_config
    }

    /// HTTP client for the configured account
    pub fn client(&self) -> Result<WufooClient> {
        let auth = WufooAuth::from_option(self.account.api_key.clone());
        let client = WufooClient::new(self.client_config(), auth)?;
        client.validate()?;
        Ok(client)
    }

    /// Reconciler honoring the matching settings
    pub fn reconciler(&self) -> FieldReconciler {
        FieldReconciler::new().with_composite_match(self.matching.composite)
    }

    /// Save hook with every configured model set up
    pub fn entry_sync<C: FormClient>(&self, client: C) -> EntrySync<C> {
        self.models
            .iter()
            .fold(EntrySync::new(client, self.reconciler()), |sync, (alias, settings)| {
                sync.with_model(alias.clone(), settings.clone())
            })
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}
