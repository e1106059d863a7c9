//! The session controller.
//!
//! Resolves whether the visitor is authenticated and decides which of the
//! console's top-level subtrees to render. The controller owns the
//! [`IdentityRecord`] and the authenticated flag; it reads and writes the
//! persisted token through an injected [`TokenStore`].
//!
//! A resolution cycle is split in two so that UI code can run the network
//! call itself without holding the controller across an await point:
//!
//! 1. [`SessionController::begin_check`] picks the effective token and
//!    enters [`SessionPhase::Resolving`].
//! 2. [`SessionController::settle`] applies the `/userinfo` outcome for that
//!    token. Outcomes for a token that is no longer current are dropped.
//!
//! [`SessionController::revalidate`] replaces the first step for a session
//! that is already authenticated: the check runs in the background and the
//! application stays on screen until the outcome is settled.
//!
//! [`SessionController::resolve`] chains both steps around an [`AuthApi`].
//!
//! ```
//! use vpn_console_platform_access::{
//!     Branch, IdentityCheck, MemoryTokenStore, RouteIntent, SessionController, UserInfo,
//! };
//!
//! let mut controller = SessionController::new(MemoryTokenStore::with_token("abc123"));
//! let token = controller.begin_check();
//! assert_eq!(token.as_str(), "abc123");
//!
//! let info = UserInfo {
//!     login: "alice".to_string(),
//!     role: "admin".to_string(),
//!     user_type: "local".to_string(),
//! };
//! controller
//!     .settle(&token, Ok(IdentityCheck::new(200, info)))
//!     .expect("cookie write");
//!
//! assert_eq!(controller.branch(&RouteIntent::from_path("/")), Branch::Authenticated);
//! assert_eq!(controller.identity().role().as_str(), "admin");
//! ```

use crate::auth::{AuthApi, IdentityCheck};
use crate::error::{ApiError, SessionError};
use crate::identity::IdentityRecord;
use crate::route::RouteIntent;
use crate::session::{SessionToken, TOKEN_COOKIE, TokenStore};
use rootcause::prelude::Report;
use tracing::{debug, warn};

/// Progress of the current identity check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// The identity check is in flight.
    #[default]
    Resolving,
    /// The identity check failed at the transport or server level. Terminal
    /// until the page is reloaded or the token changes.
    Failed(String),
    /// The identity check answered; the authenticated flag is current.
    Settled,
}

/// The subtree the console renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    /// Render nothing.
    Resolving,
    /// Render the backend error message and nothing else.
    Error(String),
    /// Render the application.
    Authenticated,
    /// Render the federation callback handler.
    CallbackHandoff { method: String, id: String },
    /// Render the federation login redirect handler.
    RedirectHandoff { method: String, id: String },
    /// Render the login form.
    Unauthenticated,
}

/// Selects the subtree for a route and session state.
///
/// Order: in-flight check, failed check, authenticated, callback route,
/// login-redirect route, login form.
#[must_use]
pub fn classify(route: &RouteIntent, phase: &SessionPhase, authenticated: bool) -> Branch {
    match phase {
        SessionPhase::Resolving => return Branch::Resolving,
        SessionPhase::Failed(message) => return Branch::Error(message.clone()),
        SessionPhase::Settled => {}
    }
    if authenticated {
        return Branch::Authenticated;
    }
    match route {
        RouteIntent::Callback { method, id } => Branch::CallbackHandoff {
            method: method.clone(),
            id: id.clone(),
        },
        RouteIntent::LoginRedirect { method, id } => Branch::RedirectHandoff {
            method: method.clone(),
            id: id.clone(),
        },
        RouteIntent::Normal => Branch::Unauthenticated,
    }
}

/// Client-side session state machine.
#[derive(Debug)]
pub struct SessionController<S> {
    store: S,
    identity: IdentityRecord,
    authenticated: bool,
    phase: SessionPhase,
}

impl<S: TokenStore> SessionController<S> {
    /// Creates a controller with an empty identity, about to resolve.
    pub fn new(store: S) -> Self {
        Self {
            store,
            identity: IdentityRecord::default(),
            authenticated: false,
            phase: SessionPhase::Resolving,
        }
    }

    /// Returns the current identity record.
    pub fn identity(&self) -> &IdentityRecord {
        &self.identity
    }

    /// Returns true once an identity check for the current token succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns the phase of the current identity check.
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Returns the token store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the token to check: the in-memory one, or else the persisted
    /// one, which is adopted into the identity record.
    pub fn effective_token(&mut self) -> SessionToken {
        if self.identity.token().is_empty() {
            if let Some(stored) = self.store.get(TOKEN_COOKIE).filter(|t| !t.is_empty()) {
                debug!("adopting persisted session token");
                self.identity = self.identity.with_token(SessionToken::new(stored));
            }
        }
        self.identity.token().clone()
    }

    /// Starts an identity check and returns the token it must be made with.
    pub fn begin_check(&mut self) -> SessionToken {
        let token = self.effective_token();
        debug!(has_token = !token.is_empty(), "identity check started");
        self.phase = SessionPhase::Resolving;
        token
    }

    /// Starts a background re-check of an authenticated session and returns
    /// the token it must be made with. The phase is left alone, so the
    /// application stays rendered until [`SessionController::settle`]
    /// applies the outcome.
    ///
    /// Returns `None` unless the session is settled and authenticated.
    pub fn revalidate(&mut self) -> Option<SessionToken> {
        if self.phase != SessionPhase::Settled || !self.authenticated {
            return None;
        }
        debug!("identity re-check started");
        Some(self.effective_token())
    }

    /// Applies the outcome of an identity check made with `token`.
    ///
    /// Returns `Ok(false)` when `token` is no longer the current token; the
    /// outcome is then ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::PersistFailed` if the token store rejects the
    /// write on the unauthenticated to authenticated edge. The session then
    /// stays unauthenticated and the phase becomes `Failed`.
    pub fn settle(
        &mut self,
        token: &SessionToken,
        outcome: Result<IdentityCheck, ApiError>,
    ) -> Result<bool, Report<SessionError>> {
        if token != self.identity.token() {
            debug!("ignoring identity check for a stale token");
            return Ok(false);
        }

        let check = match outcome {
            Ok(check) => check,
            Err(err) => {
                warn!(error = %err, "identity check failed");
                self.authenticated = false;
                self.phase = SessionPhase::Failed(err.to_string());
                return Ok(true);
            }
        };

        self.identity = self.identity.merged(&check.info);

        if check.is_authorized() {
            if !self.authenticated {
                if let Err(err) = self.store.set(TOKEN_COOKIE, token.as_str()) {
                    warn!(error = %err, "failed to persist session token");
                    self.phase = SessionPhase::Failed(err.to_string());
                    return Err(SessionError::PersistFailed {
                        details: err.to_string(),
                    }
                    .into());
                }
                self.authenticated = true;
                debug!(login = %self.identity.login(), "session authenticated");
            }
            self.phase = SessionPhase::Settled;
        } else if check.is_server_error() {
            warn!(status = check.status, "identity check hit a server error");
            self.authenticated = false;
            self.phase = SessionPhase::Failed(
                ApiError::Status {
                    status: check.status,
                    body: String::new(),
                }
                .to_string(),
            );
        } else {
            if self.authenticated {
                debug!(status = check.status, "session no longer authenticated");
            }
            self.authenticated = false;
            self.phase = SessionPhase::Settled;
        }
        Ok(true)
    }

    /// Replaces the in-memory token, for example after a login or a
    /// federation callback. The next check runs with the new token.
    pub fn adopt_token(&mut self, token: SessionToken) {
        debug!("session token replaced");
        self.identity = self.identity.with_token(token);
        self.phase = SessionPhase::Resolving;
    }

    /// Clears the persisted token and resets the identity.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ClearFailed` if the token store rejects the
    /// write. The in-memory session is reset regardless.
    pub fn logout(&mut self) -> Result<(), Report<SessionError>> {
        self.identity = IdentityRecord::default();
        self.authenticated = false;
        self.phase = SessionPhase::Resolving;
        debug!("session logged out");
        self.store
            .set(TOKEN_COOKIE, "")
            .map_err(|e| SessionError::ClearFailed {
                details: e.to_string(),
            })?;
        Ok(())
    }

    /// Selects the subtree for `route` in the current state.
    pub fn branch(&self, route: &RouteIntent) -> Branch {
        classify(route, &self.phase, self.authenticated)
    }

    /// Runs a full identity check against `api`.
    ///
    /// # Errors
    ///
    /// See [`SessionController::settle`].
    pub async fn resolve<A>(&mut self, api: &A) -> Result<(), Report<SessionError>>
    where
        A: AuthApi + ?Sized,
    {
        let token = self.begin_check();
        let outcome = api.user_info(&token).await;
        self.settle(&token, outcome)?;
        Ok(())
    }
}
