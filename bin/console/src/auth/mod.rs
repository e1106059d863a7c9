//! The session controller component and its context.
//!
//! [`Auth`] owns the [`SessionController`] and publishes its state through
//! signals. Screens read the identity with [`use_auth`]; only the controller
//! and the flows it hands off to (login, federation callback, logout) change
//! the session, through [`AuthContext`]'s methods.

mod check_role;
mod federation;
mod logout;

pub use check_role::{CheckRole, Forbidden};
pub use federation::{FederationCallback, FederationRedirect};
pub use logout::Logout;

use crate::app::AuthenticatedApp;
use crate::browser::{self, CookieTokenStore};
use crate::pages::LoginPage;
use leptos::ev;
use leptos::prelude::*;
use leptos_router::hooks::use_location;
use rootcause::prelude::Report;
use tracing::warn;
use vpn_console_platform_access::{
    ApiError, AuthApi, Branch, IdentityCheck, IdentityRecord, RouteIntent, SessionController,
    SessionError, SessionPhase, SessionToken, classify,
};

/// Session state as seen by the branch selection.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionSnapshot {
    phase: SessionPhase,
    authenticated: bool,
}

impl SessionSnapshot {
    fn of(controller: &SessionController<CookieTokenStore>) -> Self {
        Self {
            phase: controller.phase().clone(),
            authenticated: controller.is_authenticated(),
        }
    }
}

/// Handle to the session, provided as context by [`Auth`].
#[derive(Clone, Copy)]
pub struct AuthContext {
    controller: StoredValue<SessionController<CookieTokenStore>>,
    identity: RwSignal<IdentityRecord>,
    session: RwSignal<SessionSnapshot>,
    /// Token the identity check is keyed by.
    check_key: RwSignal<SessionToken>,
}

impl AuthContext {
    fn new() -> Self {
        let mut controller = SessionController::new(CookieTokenStore);
        let token = controller.begin_check();
        Self {
            identity: RwSignal::new(controller.identity().clone()),
            session: RwSignal::new(SessionSnapshot::of(&controller)),
            check_key: RwSignal::new(token),
            controller: StoredValue::new(controller),
        }
    }

    /// The current identity record.
    pub fn identity(&self) -> ReadSignal<IdentityRecord> {
        self.identity.read_only()
    }

    /// Copies the controller's state into the signals.
    fn publish(&self) {
        let Some((identity, session)) = self
            .controller
            .try_with_value(|c| (c.identity().clone(), SessionSnapshot::of(c)))
        else {
            return;
        };
        if self.identity.with_untracked(|current| current != &identity) {
            self.identity.set(identity);
        }
        if self.session.with_untracked(|current| current != &session) {
            self.session.set(session);
        }
    }

    fn settle(&self, token: &SessionToken, outcome: Result<IdentityCheck, ApiError>) {
        let result = self.controller.try_update_value(|c| c.settle(token, outcome));
        if let Some(Err(report)) = result {
            warn!(error = %report, "identity check could not be applied");
        }
        self.publish();
    }

    /// Replaces the session token and re-runs the identity check.
    pub fn adopt_token(&self, token: SessionToken) {
        let key = self.controller.try_update_value(|c| {
            c.adopt_token(token);
            c.begin_check()
        });
        self.publish();
        if let Some(key) = key {
            self.check_key.set(key);
        }
    }

    /// Re-checks an authenticated session in the background. The
    /// application stays rendered unless the check rejects the token.
    pub fn revalidate(&self) {
        if let Some(Some(key)) = self.controller.try_update_value(|c| c.revalidate()) {
            self.check_key.set(key);
        }
    }

    /// Ends the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cookie could not be cleared.
    pub fn logout(&self) -> Result<(), Report<SessionError>> {
        let result = self
            .controller
            .try_update_value(|c| c.logout())
            .unwrap_or(Ok(()));
        self.publish();
        result
    }

    fn branch(&self, route: &RouteIntent) -> Branch {
        self.session.with(|s| classify(route, &s.phase, s.authenticated))
    }
}

/// Returns the session context.
///
/// # Panics
///
/// Panics if called outside [`Auth`].
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Session controller: renders nothing while the identity check runs, then
/// the backend error, the application, a federation handler or the login
/// form.
#[component]
pub fn Auth() -> impl IntoView {
    let auth = AuthContext::new();
    provide_context(auth);
    let location = use_location();

    let check = LocalResource::new(move || {
        let token = auth.check_key.get();
        async move {
            let outcome = match browser::api_client() {
                Ok(api) => api.user_info(&token).await,
                Err(e) => Err(ApiError::Request {
                    details: e.to_string(),
                }),
            };
            (token, outcome)
        }
    });

    Effect::new(move |_| {
        if let Some((token, outcome)) = check.get() {
            auth.settle(&token, outcome);
        }
    });

    // Re-check the session on navigation and when the window regains focus.
    Effect::new(move |previous: Option<String>| {
        let path = location.pathname.get();
        if previous.is_some_and(|previous| previous != path) {
            auth.revalidate();
        }
        path
    });
    Effect::new(move |_| {
        let focus = window_event_listener(ev::focus, move |_| auth.revalidate());
        on_cleanup(move || focus.remove());
    });

    let branch =
        Memo::new(move |_| auth.branch(&RouteIntent::from_path(&location.pathname.get())));

    move || match branch.get() {
        Branch::Resolving => ().into_any(),
        Branch::Error(message) => format!("A backend error has occurred: {message}").into_any(),
        Branch::Authenticated => view! { <AuthenticatedApp/> }.into_any(),
        Branch::CallbackHandoff { method, id } => {
            view! { <FederationCallback method=method id=id/> }.into_any()
        }
        Branch::RedirectHandoff { method, id } => {
            view! { <FederationRedirect method=method id=id/> }.into_any()
        }
        Branch::Unauthenticated => view! { <LoginPage/> }.into_any(),
    }
}
