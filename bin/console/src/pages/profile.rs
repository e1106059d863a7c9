//! Profile page component.

use crate::auth::use_auth;
use leptos::prelude::*;

/// Shows who is signed in.
#[component]
pub fn ProfilePage() -> impl IntoView {
    let identity = use_auth().identity();
    let login = move || identity.with(|identity| identity.login().to_string());
    let role = move || identity.with(|identity| identity.role().to_string());
    let account_type = move || {
        identity.with(|identity| match identity.user_type().as_str() {
            "" => "unknown".to_string(),
            user_type => user_type.to_string(),
        })
    };
    let federated = move || identity.with(|identity| !identity.user_type().manages_credentials());

    view! {
        <div class="profile-page">
            <h1>"Profile"</h1>
            <dl>
                <dt>"Login"</dt>
                <dd>{login}</dd>
                <dt>"Role"</dt>
                <dd>{role}</dd>
                <dt>"Account type"</dt>
                <dd>{account_type}</dd>
            </dl>
            <Show when=federated>
                <p>"Password and MFA settings are managed by your identity provider."</p>
            </Show>
        </div>
    }
}
