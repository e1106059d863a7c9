//! Domain error types for the console binary.
//!
//! Library crates report API and session failures; this module covers what
//! only the binary does: starting the server and talking to the browser.

use std::fmt;

/// Errors while starting or running the server.
#[derive(Debug)]
pub enum ServerError {
    /// Environment configuration is missing or invalid.
    Config { details: String },
    /// The Leptos site configuration could not be loaded.
    LeptosConfig { details: String },
    /// The listen address could not be bound.
    Bind { addr: String, details: String },
    /// The server stopped with an error.
    Serve { details: String },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {}", details),
            Self::LeptosConfig { details } => {
                write!(f, "failed to load site configuration: {}", details)
            }
            Self::Bind { addr, details } => {
                write!(f, "failed to bind to '{}': {}", addr, details)
            }
            Self::Serve { details } => write!(f, "server error: {}", details),
        }
    }
}

impl std::error::Error for ServerError {}

/// Errors from browser facilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// Not running in a browser (server-side render).
    NoWindow,
    /// The API client could not be configured.
    ApiClient { details: String },
    /// Navigation or history manipulation failed.
    Navigation { details: String },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no browser window"),
            Self::ApiClient { details } => write!(f, "API client unavailable: {}", details),
            Self::Navigation { details } => write!(f, "navigation failed: {}", details),
        }
    }
}

impl std::error::Error for BrowserError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_names_address() {
        let err = ServerError::Bind {
            addr: "127.0.0.1:3000".to_string(),
            details: "address in use".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to bind to '127.0.0.1:3000': address in use"
        );
    }

    #[test]
    fn browser_error_display() {
        assert_eq!(BrowserError::NoWindow.to_string(), "no browser window");
        let err = BrowserError::ApiClient {
            details: "invalid API base URL 'x'".to_string(),
        };
        assert!(err.to_string().starts_with("API client unavailable"));
    }
}
