use super::use_auth;
use crate::browser;
use leptos::prelude::*;
use tracing::warn;

/// Ends the session, then reloads the console at `/`.
#[component]
pub fn Logout() -> impl IntoView {
    let auth = use_auth();

    Effect::new(move |_| {
        if let Err(report) = auth.logout() {
            warn!(error = %report, "failed to clear session cookie");
        }
        if let Err(err) = browser::reload_at_root() {
            warn!(error = %err, "failed to reload after logout");
        }
    });
}
