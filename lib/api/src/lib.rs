//! HTTP client for the VPN server admin API.
//!
//! [`ApiClient`] implements the `AuthApi` and `UpgradeApi` traits from
//! `vpn-console-platform-access` on top of `reqwest`, which uses `fetch` when
//! compiled for the browser.

pub mod client;
pub mod config;

pub use client::ApiClient;
pub use config::{API_PATH, ClientConfig, ConfigError, normalize_base_url};
