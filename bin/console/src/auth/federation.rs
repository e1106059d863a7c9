//! Handlers for the federation login and callback routes.

use super::use_auth;
use crate::browser;
use leptos::prelude::*;
use leptos_router::hooks::use_location;
use tracing::warn;
use vpn_console_platform_access::{
    CallbackRequest, FederationError, complete_callback, resolve_redirect, validate_redirect,
};

/// Handles `/callback/:type/:id`: exchanges the provider's code for a
/// session token and hands the token to the session controller.
#[component]
pub fn FederationCallback(method: String, id: String) -> impl IntoView {
    let auth = use_auth();
    let location = use_location();
    let callback = CallbackRequest::from_location(
        &method,
        &id,
        &location.pathname.get_untracked(),
        &location.search.get_untracked(),
    );

    // Reads no signals, so the exchange runs once per mount.
    let exchange = LocalResource::new(move || {
        let callback = callback.clone();
        async move {
            let api = browser::api_client().map_err(|e| FederationError::Exchange {
                details: e.to_string(),
            })?;
            complete_callback(&api, &callback).await
        }
    });

    Effect::new(move |_| {
        if let Some(Ok(token)) = exchange.get() {
            auth.adopt_token(token);
        }
    });

    move || match exchange.get() {
        Some(Err(err)) => format!("Could not obtain token: {err}").into_any(),
        _ => ().into_any(),
    }
}

/// Handles `/login/:type/:id`: looks up the provider's login URL and sends
/// the browser there. Ids that are not UUIDs are rejected without a request.
#[component]
pub fn FederationRedirect(method: String, id: String) -> impl IntoView {
    if let Err(err) = validate_redirect(&method, &id) {
        return err.to_string().into_any();
    }

    let lookup = LocalResource::new(move || {
        let (method, id) = (method.clone(), id.clone());
        async move {
            let api = browser::api_client().map_err(|e| FederationError::Redirect {
                details: e.to_string(),
            })?;
            resolve_redirect(&api, &method, &id).await
        }
    });

    Effect::new(move |_| {
        if let Some(Ok(uri)) = lookup.get() {
            if let Err(err) = browser::navigate_external(&uri) {
                warn!(error = %err, "failed to follow provider redirect");
            }
        }
    });

    view! {
        {move || match lookup.get() {
            Some(Err(err)) => format!("Could not redirect at this time: {err}").into_any(),
            _ => ().into_any(),
        }}
    }
    .into_any()
}
