//! Session tokens and their persistence.
//!
//! The backend issues an opaque bearer token. The console keeps it in memory
//! (inside the identity record) and persists it under a fixed name through a
//! [`TokenStore`], which in the browser is the `token` cookie at path `/`.
//! Validity is never judged client-side: a token is good exactly when the
//! identity check accepts it.

use crate::error::TokenStoreError;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

/// Name under which the session token is persisted.
pub const TOKEN_COOKIE: &str = "token";

/// Opaque bearer token issued by the backend.
///
/// The empty token means "no session"; it is still sent as a bearer
/// credential so that the backend can answer 401.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a token from a string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the "no session" token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value of an `Authorization` header carrying this token.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Tokens end up in log lines via `?` formatting; never print them.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("SessionToken(<empty>)")
        } else {
            f.write_str("SessionToken(<redacted>)")
        }
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Key-value persistence capability for the session token.
///
/// Implementations use interior mutability: the browser's cookie jar is a
/// shared global and is written through `&self`.
pub trait TokenStore {
    /// Returns the stored value for `name`, if any.
    fn get(&self, name: &str) -> Option<String>;

    /// Stores `value` under `name`. An empty value clears the entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn set(&self, name: &str, value: &str) -> Result<(), TokenStoreError>;
}

impl<T: TokenStore + ?Sized> TokenStore for &T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&self, name: &str, value: &str) -> Result<(), TokenStoreError> {
        (**self).set(name, value)
    }
}

/// In-memory token store.
///
/// Used where no browser cookie jar exists (server-side builds, tests). It
/// counts writes so that callers can observe write-once behaviour.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `token` under [`TOKEN_COOKIE`].
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store
            .values
            .borrow_mut()
            .insert(TOKEN_COOKIE.to_string(), token.to_string());
        store
    }

    /// Number of `set` calls performed so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.borrow().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), TokenStoreError> {
        self.writes.set(self.writes.get() + 1);
        let mut values = self.values.borrow_mut();
        if value.is_empty() {
            values.remove(name);
        } else {
            values.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_value() {
        assert_eq!(SessionToken::from("abc123").bearer(), "Bearer abc123");
        assert_eq!(SessionToken::default().bearer(), "Bearer ");
    }

    #[test]
    fn debug_never_prints_token() {
        let rendered = format!("{:?}", SessionToken::from("secret-value"));
        assert!(!rendered.contains("secret-value"));
        assert_eq!(format!("{:?}", SessionToken::default()), "SessionToken(<empty>)");
    }

    #[test]
    fn memory_store_set_and_get() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(TOKEN_COOKIE), None);

        store.set(TOKEN_COOKIE, "abc").expect("set");
        assert_eq!(store.get(TOKEN_COOKIE).as_deref(), Some("abc"));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn memory_store_empty_value_clears() {
        let store = MemoryTokenStore::with_token("abc");
        store.set(TOKEN_COOKIE, "").expect("clear");
        assert_eq!(store.get(TOKEN_COOKIE), None);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn store_reference_delegates() {
        let store = MemoryTokenStore::new();
        let by_ref: &MemoryTokenStore = &store;
        by_ref.set(TOKEN_COOKIE, "xyz").expect("set");
        assert_eq!(store.get(TOKEN_COOKIE).as_deref(), Some("xyz"));
    }
}
