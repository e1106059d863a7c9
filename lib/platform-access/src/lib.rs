//! Session, identity and role handling for the VPN server admin console.
//!
//! This crate provides:
//! - The session controller (`SessionController`) and branch selection
//!   (`classify`, `Branch`)
//! - The identity record (`IdentityRecord`, `UserType`) and roles (`Role`)
//! - Session token persistence (`SessionToken`, `TokenStore`)
//! - Federation (OIDC/SAML) and local login flows
//! - The upgrade status tracker
//! - The `AuthApi` and `UpgradeApi` transport traits and their wire types
//!
//! # Access Control Model
//!
//! The backend is the only judge of a token: the console is authenticated
//! exactly when `/userinfo` accepts the current token. Screens are then gated
//! on the user's single role string, compared by strict equality.
//!
//! # Example
//!
//! ```
//! use vpn_console_platform_access::{check_role, Role, RouteIntent};
//!
//! assert!(check_role(&Role::admin(), &Role::admin()).is_ok());
//! assert!(check_role(&Role::user(), &Role::admin()).is_err());
//!
//! let route = RouteIntent::from_path("/login/oidc/not-a-uuid");
//! assert!(route.is_federation());
//! ```

pub mod auth;
pub mod controller;
pub mod error;
pub mod federation;
pub mod identity;
pub mod login;
pub mod role;
pub mod route;
pub mod session;
pub mod upgrade;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use auth::{
    AuthApi, AuthMethods, AuthMethodsProvider, FactorResponse, IdentityCheck, LoginRequest,
    LoginResponse, TokenExchangeRequest, UserInfo,
};
pub use controller::{Branch, SessionController, SessionPhase, classify};
pub use error::{
    ApiError, AuthorizationError, FederationError, LoginError, SessionError, TokenStoreError,
};
pub use federation::{
    CallbackRequest, FederationKind, RedirectTarget, complete_callback, resolve_redirect,
    validate_redirect,
};
pub use identity::{IdentityRecord, UserType};
pub use login::{LoginForm, LoginOutcome, login_outcome, provider_error_message, submit_login};
pub use role::{ADMIN_ROLE, Role, USER_ROLE, check_role};
pub use route::RouteIntent;
pub use session::{MemoryTokenStore, SessionToken, TOKEN_COOKIE, TokenStore};
pub use upgrade::{
    MAX_UPGRADE_CHECKS, UPGRADE_CHECK_INTERVAL, UpgradeApi, UpgradeState, UpgradeStatus,
    UpgradeTracker,
};
