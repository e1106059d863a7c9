//! VPN server admin console.
//!
//! This crate provides the Leptos-based web interface of the appliance: the
//! session controller that decides between the application, the federation
//! handlers and the login form, plus the screens behind it. The `ssr`
//! feature builds the server that renders the page shell and serves the
//! compiled client.

#![allow(non_snake_case)]

pub mod app;
pub mod auth;
pub mod browser;
pub mod error;
pub mod pages;

#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod proxy;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::App;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
