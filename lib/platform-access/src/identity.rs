//! The signed-in user's identity.
//!
//! An [`IdentityRecord`] is an immutable value: every change produces a new
//! record which the session controller publishes to the rest of the UI.

use crate::auth::UserInfo;
use crate::role::Role;
use crate::session::SessionToken;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of account the user signed in with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserType {
    /// Account with a password (and optional MFA factors) kept by the appliance.
    Local,
    /// Account federated through an OIDC provider.
    Oidc,
    /// Account federated through a SAML provider.
    Saml,
    /// Not reported yet, or a type this console does not know.
    #[default]
    Unknown,
}

impl UserType {
    /// Returns the backend string for this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Oidc => "oidc",
            Self::Saml => "saml",
            Self::Unknown => "",
        }
    }

    /// Returns true if the console manages this account's password and MFA
    /// factors. Federated accounts are managed by their provider.
    #[must_use]
    pub fn manages_credentials(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl From<String> for UserType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "local" => Self::Local,
            "oidc" => Self::Oidc,
            "saml" => Self::Saml,
            _ => Self::Unknown,
        }
    }
}

impl From<UserType> for String {
    fn from(t: UserType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory identity of the current visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRecord {
    login: String,
    role: Role,
    token: SessionToken,
    user_type: UserType,
}

impl IdentityRecord {
    /// Creates a record with every field set.
    #[must_use]
    pub fn new(login: String, role: Role, token: SessionToken, user_type: UserType) -> Self {
        Self {
            login,
            role,
            token,
            user_type,
        }
    }

    /// Returns the login name.
    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Returns the session token.
    #[must_use]
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Returns the account type.
    #[must_use]
    pub fn user_type(&self) -> &UserType {
        &self.user_type
    }

    /// Returns a copy of this record carrying `token`.
    #[must_use]
    pub fn with_token(&self, token: SessionToken) -> Self {
        Self {
            token,
            ..self.clone()
        }
    }

    /// Returns a copy with `login`, `role` and `userType` taken from `info`.
    ///
    /// An `info` without a login carries no identity and leaves the record
    /// unchanged.
    #[must_use]
    pub fn merged(&self, info: &UserInfo) -> Self {
        if info.login.is_empty() {
            return self.clone();
        }
        Self {
            login: info.login.clone(),
            role: Role::new(info.role.clone()),
            user_type: UserType::from(info.user_type.clone()),
            token: self.token.clone(),
        }
    }
}
