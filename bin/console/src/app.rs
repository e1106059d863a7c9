//! Main Leptos application component and routing.

use crate::auth::{Auth, CheckRole, Logout, use_auth};
use crate::pages::{HomePage, ProfilePage, UpgradePage};
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    components::{Redirect, Route, Router, Routes},
    path,
};
use vpn_console_platform_access::Role;

/// The main application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="VPN Server"/>
        <Router>
            <Auth/>
        </Router>
    }
}

/// The application shown to an authenticated user.
#[component]
pub fn AuthenticatedApp() -> impl IntoView {
    view! {
        <Header/>
        <main class="container">
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=path!("/") view=HomePage/>
                <Route path=path!("/profile") view=ProfilePage/>
                <Route
                    path=path!("/upgrade")
                    view=|| view! { <CheckRole role=Role::admin()><UpgradePage/></CheckRole> }
                />
                <Route path=path!("/logout") view=Logout/>
                // Federation routes finish here once the session is authenticated.
                <Route path=path!("/login/:method/:id") view=|| view! { <Redirect path="/"/> }/>
                <Route path=path!("/callback/:method/:id") view=|| view! { <Redirect path="/"/> }/>
            </Routes>
        </main>
    }
}

/// Header component with navigation and user menu.
#[component]
fn Header() -> impl IntoView {
    let identity = use_auth().identity();
    let login = move || identity.with(|identity| identity.login().to_string());
    let is_admin = move || identity.with(|identity| identity.role().is_admin());

    view! {
        <header class="header">
            <div class="header-left">
                <a href="/" class="logo">"VPN Server"</a>
            </div>
            <nav class="header-right">
                <a href="/">"Home"</a>
                <Show when=is_admin>
                    <a href="/upgrade">"Upgrade"</a>
                </Show>
                <a href="/profile">{login}</a>
                <a href="/logout">"Logout"</a>
            </nav>
        </header>
    }
}
