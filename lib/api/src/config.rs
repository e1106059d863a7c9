//! Client configuration.
//!
//! The admin API is served under `/api` on the same origin as the console.
//! A build can point elsewhere by setting `VPN_CONSOLE_API_URL` at compile
//! time, since the console runs in the browser and has no environment.

use std::fmt;

/// Compile-time override of the API base URL.
pub const API_URL_OVERRIDE: Option<&str> = option_env!("VPN_CONSOLE_API_URL");

/// Path of the API relative to the console's origin.
pub const API_PATH: &str = "/api";

/// Errors from building a client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No base URL was given.
    EmptyBaseUrl,
    /// The base URL is not an absolute `http(s)` URL.
    InvalidBaseUrl { url: String },
    /// The HTTP client could not be constructed.
    ClientBuild { details: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBaseUrl => write!(f, "API base URL is empty"),
            Self::InvalidBaseUrl { url } => write!(f, "invalid API base URL '{url}'"),
            Self::ClientBuild { details } => write!(f, "failed to build HTTP client: {details}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the admin API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
}

impl ClientConfig {
    /// Creates a configuration for an explicit base URL.
    ///
    /// # Errors
    ///
    /// See [`normalize_base_url`].
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
        })
    }

    /// Resolves the configuration for a console served from `origin`.
    ///
    /// # Errors
    ///
    /// See [`normalize_base_url`].
    pub fn for_origin(origin: &str) -> Result<Self, ConfigError> {
        match API_URL_OVERRIDE.filter(|url| !url.trim().is_empty()) {
            Some(url) => Self::new(url),
            None => Self::new(&format!("{}{API_PATH}", origin.trim().trim_end_matches('/'))),
        }
    }

    /// Returns the normalized base URL, without a trailing slash.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

/// Trims whitespace and trailing slashes and checks for an `http(s)` host.
///
/// # Errors
///
/// Returns `EmptyBaseUrl` for blank input and `InvalidBaseUrl` when the
/// scheme is missing or no host follows it.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let invalid = || ConfigError::InvalidBaseUrl {
        url: trimmed.to_string(),
    };
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        return Err(invalid());
    };
    if !matches!(scheme, "http" | "https") || remainder.is_empty() || remainder.starts_with('/') {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_slashes_and_whitespace() {
        assert_eq!(
            normalize_base_url("  https://vpn.example.com/api/ "),
            Ok("https://vpn.example.com/api".to_string())
        );
    }

    #[test]
    fn normalize_rejects_bad_urls() {
        assert_eq!(normalize_base_url("   "), Err(ConfigError::EmptyBaseUrl));
        for raw in ["vpn.example.com", "ftp://vpn.example.com", "https://", "http:///api"] {
            assert!(
                matches!(normalize_base_url(raw), Err(ConfigError::InvalidBaseUrl { .. })),
                "{raw}"
            );
        }
    }

    #[test]
    fn origin_gets_api_path() {
        if API_URL_OVERRIDE.is_some() {
            return;
        }
        let config = ClientConfig::for_origin("http://10.0.0.1:8080/").expect("config");
        assert_eq!(config.api_base_url(), "http://10.0.0.1:8080/api");
    }
}
