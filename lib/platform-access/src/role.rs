//! Roles and the role gate.
//!
//! The backend reports a single role string per user (`admin` or `user`).
//! Route gating compares that string with the route's required role by
//! strict equality: there is no hierarchy, so `admin` does not imply `user`.

use crate::error::AuthorizationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role string of administrators.
pub const ADMIN_ROLE: &str = "admin";

/// Role string of regular users.
pub const USER_ROLE: &str = "user";

/// A user's role as reported by the backend.
///
/// Unknown role strings are kept verbatim; they simply never match a gate
/// that asks for a different string. The empty role is what an anonymous
/// visitor has.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Creates a role from its backend string.
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    /// The administrator role.
    #[must_use]
    pub fn admin() -> Self {
        Self::new(ADMIN_ROLE)
    }

    /// The regular user role.
    #[must_use]
    pub fn user() -> Self {
        Self::new(USER_ROLE)
    }

    /// Returns the role as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no role is known (anonymous visitor).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if this is exactly the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_ROLE
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Checks that `actual` is exactly `required`.
///
/// # Errors
///
/// Returns `AuthorizationError::RoleMismatch` on any difference.
pub fn check_role(required: &Role, actual: &Role) -> Result<(), AuthorizationError> {
    if required == actual {
        Ok(())
    } else {
        Err(AuthorizationError::RoleMismatch {
            required: required.to_string(),
            actual: actual.to_string(),
        })
    }
}
