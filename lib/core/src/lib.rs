//! Core types and utilities for the VPN server admin console.
//!
//! This crate provides the error handling foundation and the strongly-typed
//! identifiers shared by the console's libraries and its web frontend.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, ProviderId};
