//! Error types for the platform-access crate.
//!
//! Errors are split by the layer that produces them:
//! - `ApiError`: transport and HTTP status failures from the backend API
//! - `TokenStoreError`: failures of the persisted token capability (cookies)
//! - `SessionError`: session controller failures, reported through rootcause
//! - `AuthorizationError`: role gate denials
//! - `FederationError`: OIDC/SAML callback and redirect failures
//! - `LoginError`: local (password + MFA) login failures
//!
//! The `Display` output of `FederationError` and `LoginError` is what the
//! console shows to the user, so those strings are part of the UI contract.

use std::fmt;

/// Errors from calls to the appliance's REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (network, CORS, DNS).
    Request { details: String },
    /// The backend answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body could not be decoded.
    Decode { details: String },
}

impl ApiError {
    /// Returns the HTTP status code, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request { .. } | Self::Decode { .. } => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { details } => write!(f, "request failed: {details}"),
            Self::Status { status, .. } => {
                write!(f, "Request failed with status code {status}")
            }
            Self::Decode { details } => write!(f, "invalid response body: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Errors from the persisted token capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStoreError {
    /// The backing store (e.g. `document.cookie`) cannot be reached.
    Unavailable { details: String },
    /// A value could not be written.
    WriteFailed { name: String, details: String },
}

impl fmt::Display for TokenStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => write!(f, "token store unavailable: {details}"),
            Self::WriteFailed { name, details } => {
                write!(f, "failed to write '{name}': {details}")
            }
        }
    }
}

impl std::error::Error for TokenStoreError {}

/// Errors from session controller operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session token could not be persisted after a successful check.
    PersistFailed { details: String },
    /// The session token could not be cleared on logout.
    ClearFailed { details: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersistFailed { details } => {
                write!(f, "failed to persist session token: {details}")
            }
            Self::ClearFailed { details } => {
                write!(f, "failed to clear session token: {details}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors from authorization operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The signed-in user's role is not exactly the required role.
    RoleMismatch { required: String, actual: String },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleMismatch { required, actual } => {
                write!(f, "role '{required}' required, user has '{actual}'")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

/// Errors from the federation (OIDC/SAML) callback and redirect flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FederationError {
    /// The login method in the URL is neither `oidc` nor `saml`.
    UnsupportedMethod { method: String },
    /// The provider id in the URL is not a UUID. `label` is `OIDC` or `SAML`.
    InvalidProviderId { label: &'static str },
    /// The backend reports the user as suspended.
    Suspended,
    /// The backend has no license seat left for a new user.
    NoLicense,
    /// The backend rejected the authorization code.
    InvalidCredentials,
    /// The token exchange failed for another reason.
    Exchange { details: String },
    /// The backend returned no provider redirect URI.
    EmptyRedirect,
    /// The redirect URI lookup failed.
    Redirect { details: String },
}

impl FederationError {
    /// Returns true for failures of the token exchange leg.
    #[must_use]
    pub fn is_exchange_failure(&self) -> bool {
        matches!(
            self,
            Self::Suspended | Self::NoLicense | Self::InvalidCredentials | Self::Exchange { .. }
        )
    }
}

impl fmt::Display for FederationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedMethod { method } => {
                write!(f, "Unsupported login method '{method}'")
            }
            Self::InvalidProviderId { label } => {
                write!(f, "Invalid {label} method id (expected UUID)")
            }
            Self::Suspended => write!(f, "user is suspended"),
            Self::NoLicense => write!(
                f,
                "user can't be added, because user license limit has been reached"
            ),
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::Exchange { details } => write!(f, "Error: {details}"),
            Self::EmptyRedirect => write!(f, "redirectURI is empty"),
            Self::Redirect { details } => write!(f, "{details}"),
        }
    }
}

impl std::error::Error for FederationError {}

/// Errors from local username/password login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Wrong login, password or MFA code.
    InvalidCredentials,
    /// The backend is throttling this login.
    TooManyAttempts,
    /// Any other failure.
    Other { details: String },
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::TooManyAttempts => write!(f, "too many attempts. Try again later"),
            Self::Other { details } => write!(f, "Error: {details}"),
        }
    }
}

impl std::error::Error for LoginError {}
