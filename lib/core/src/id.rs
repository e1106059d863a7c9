//! Strongly-typed identifiers for backend entities.
//!
//! The appliance identifies federation providers (OIDC and SAML) by a
//! hyphenated UUID, and that identifier travels through browser URLs such as
//! `/login/oidc/<id>`. Parsing is strict so that a malformed URL segment is
//! rejected before it is spliced into a backend request path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the canonical hyphenated UUID form (`8-4-4-4-12`).
const HYPHENATED_LEN: usize = 36;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Unique identifier for a federation (OIDC or SAML) provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(Uuid);

impl ProviderId {
    /// Creates an ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ProviderId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Simple, braced and URN encodings are valid UUIDs but never appear
        // in provider URLs.
        if s.len() != HYPHENATED_LEN {
            return Err(ParseIdError {
                id_type: "ProviderId",
                reason: format!("expected {HYPHENATED_LEN} characters, got {}", s.len()),
            });
        }

        Uuid::try_parse(s).map(Self).map_err(|e| ParseIdError {
            id_type: "ProviderId",
            reason: e.to_string(),
        })
    }
}

impl From<Uuid> for ProviderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ProviderId> for Uuid {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVIDER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    #[test]
    fn parse_hyphenated() {
        let id: ProviderId = PROVIDER.parse().expect("should parse");
        assert_eq!(id.to_string(), PROVIDER);
    }

    #[test]
    fn display_is_lowercase() {
        let id: ProviderId = PROVIDER.to_uppercase().parse().expect("should parse");
        assert_eq!(id.to_string(), PROVIDER);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<ProviderId>().unwrap_err();
        assert_eq!(err.id_type, "ProviderId");
    }

    #[test]
    fn parse_rejects_simple_form() {
        let simple = PROVIDER.replace('-', "");
        assert!(simple.parse::<ProviderId>().is_err());
    }

    #[test]
    fn parse_rejects_bad_hex_of_right_length() {
        let bad = "3fa85f64-5717-4562-b3fc-2c963f66afzz";
        assert_eq!(bad.len(), 36);
        assert!(bad.parse::<ProviderId>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id: ProviderId = PROVIDER.parse().expect("should parse");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{PROVIDER}\""));
    }
}
