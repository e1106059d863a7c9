//! Role-gated rendering.

use super::use_auth;
use leptos::prelude::*;
use tracing::debug;
use vpn_console_platform_access::{Role, check_role};

/// Renders `children` only if the signed-in user's role is exactly `role`;
/// otherwise renders [`Forbidden`].
#[component]
pub fn CheckRole(#[prop(into)] role: Role, children: ChildrenFn) -> impl IntoView {
    let identity = use_auth().identity();

    move || match identity.with(|identity| check_role(&role, identity.role())) {
        Ok(()) => children().into_any(),
        Err(err) => {
            debug!(error = %err, "role gate denied access");
            view! { <Forbidden/> }.into_any()
        }
    }
}

/// The 403 page.
#[component]
pub fn Forbidden() -> impl IntoView {
    view! {
        <div class="forbidden">
            <div class="forbidden-label">"403"</div>
            <h1>"You have found a secret place."</h1>
            <p>"Unfortunately, you don't have access to this page."</p>
            <a href="/">"Take me back to home page"</a>
        </div>
    }
}
