//! Server configuration.
//!
//! Loaded via the `config` crate from environment variables. The Leptos
//! site settings (address, site root) come from `cargo-leptos` instead, see
//! [`leptos::prelude::get_configuration`].

use serde::Deserialize;
use vpn_console_api::{ConfigError, normalize_base_url};

/// Server configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the admin API. When set, `/api` is forwarded there so the
    /// console and the API share an origin. Read from `API_UPSTREAM`.
    #[serde(default)]
    pub api_upstream: Option<String>,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// The normalized upstream URL, or `None` when forwarding is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is not an `http(s)` URL.
    pub fn api_upstream(&self) -> Result<Option<String>, ConfigError> {
        match self.api_upstream.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(url) => normalize_base_url(url).map(Some),
        }
    }
}
