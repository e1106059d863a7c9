//! Home page component.

use crate::auth::use_auth;
use leptos::prelude::*;

/// The home page component.
#[component]
pub fn HomePage() -> impl IntoView {
    let identity = use_auth().identity();
    let greeting = move || {
        identity.with(|identity| match identity.login() {
            "" => "Welcome!".to_string(),
            login => format!("Welcome, {}!", login),
        })
    };

    view! {
        <div class="home-page">
            <h1>{greeting}</h1>
            <p>"Manage your VPN server from the menu above."</p>
        </div>
    }
}
