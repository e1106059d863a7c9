//! Browser facilities: the cookie-backed token store, the API client for
//! the page's origin, and navigation.
//!
//! Without the `hydrate` feature (server-side rendering) there is no
//! browser: the cookie jar is empty and every other facility reports
//! [`BrowserError::NoWindow`].

use crate::error::BrowserError;
use vpn_console_api::{ApiClient, ClientConfig};
use vpn_console_platform_access::{TokenStore, TokenStoreError};

/// Title used when rewriting history.
#[cfg(feature = "hydrate")]
const DOCUMENT_TITLE: &str = "VPN Server";

/// Token store backed by `document.cookie`. Cookies are written at path `/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieTokenStore;

#[cfg(feature = "hydrate")]
fn html_document() -> Result<web_sys::HtmlDocument, TokenStoreError> {
    use wasm_bindgen::JsCast;

    leptos::prelude::document()
        .dyn_into::<web_sys::HtmlDocument>()
        .map_err(|_| TokenStoreError::Unavailable {
            details: "document is not an HTML document".to_string(),
        })
}

#[cfg(feature = "hydrate")]
impl TokenStore for CookieTokenStore {
    fn get(&self, name: &str) -> Option<String> {
        let jar = html_document().ok()?.cookie().ok()?;
        find_cookie(&jar, name)
    }

    fn set(&self, name: &str, value: &str) -> Result<(), TokenStoreError> {
        let cookie = token_cookie(name, value);
        html_document()?
            .set_cookie(&cookie)
            .map_err(|e| TokenStoreError::WriteFailed {
                name: name.to_string(),
                details: format!("{e:?}"),
            })
    }
}

#[cfg(not(feature = "hydrate"))]
impl TokenStore for CookieTokenStore {
    fn get(&self, _name: &str) -> Option<String> {
        None
    }

    fn set(&self, _name: &str, _value: &str) -> Result<(), TokenStoreError> {
        Ok(())
    }
}

/// Finds a cookie's value in a `document.cookie` string.
#[cfg(feature = "hydrate")]
fn find_cookie(jar: &str, name: &str) -> Option<String> {
    cookie::Cookie::split_parse(jar.to_string())
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// Renders the `document.cookie` assignment for the session token.
#[cfg(feature = "hydrate")]
fn token_cookie(name: &str, value: &str) -> String {
    cookie::Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .build()
        .to_string()
}

/// Returns a client for the API served alongside the console.
///
/// # Errors
///
/// Returns `NoWindow` outside the browser and `ApiClient` if the page's
/// origin does not yield a usable base URL.
pub fn api_client() -> Result<ApiClient, BrowserError> {
    let origin = origin()?;
    let config = ClientConfig::for_origin(&origin).map_err(|e| BrowserError::ApiClient {
        details: e.to_string(),
    })?;
    ApiClient::new(&config).map_err(|report| BrowserError::ApiClient {
        details: report.current_context().to_string(),
    })
}

#[cfg(feature = "hydrate")]
fn origin() -> Result<String, BrowserError> {
    leptos::prelude::window()
        .location()
        .origin()
        .map_err(|e| BrowserError::Navigation {
            details: format!("{e:?}"),
        })
}

#[cfg(not(feature = "hydrate"))]
fn origin() -> Result<String, BrowserError> {
    Err(BrowserError::NoWindow)
}

/// Sends the browser to another site, such as a federation provider.
///
/// # Errors
///
/// Returns an error if the location cannot be changed.
#[cfg(feature = "hydrate")]
pub fn navigate_external(url: &str) -> Result<(), BrowserError> {
    leptos::prelude::window()
        .location()
        .set_href(url)
        .map_err(|e| BrowserError::Navigation {
            details: format!("{e:?}"),
        })
}

#[cfg(not(feature = "hydrate"))]
pub fn navigate_external(_url: &str) -> Result<(), BrowserError> {
    Err(BrowserError::NoWindow)
}

/// Replaces the current history entry with `/` and reloads the page.
///
/// # Errors
///
/// Returns an error if history or location cannot be changed.
#[cfg(feature = "hydrate")]
pub fn reload_at_root() -> Result<(), BrowserError> {
    let window = leptos::prelude::window();
    let navigation = |e: wasm_bindgen::JsValue| BrowserError::Navigation {
        details: format!("{e:?}"),
    };
    window
        .history()
        .map_err(navigation)?
        .replace_state_with_url(&wasm_bindgen::JsValue::NULL, DOCUMENT_TITLE, Some("/"))
        .map_err(navigation)?;
    window.location().reload().map_err(navigation)
}

#[cfg(not(feature = "hydrate"))]
pub fn reload_at_root() -> Result<(), BrowserError> {
    Err(BrowserError::NoWindow)
}
