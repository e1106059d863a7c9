//! Wire types and the transport trait for the appliance's auth endpoints.
//!
//! Field names follow the backend's JSON (`userType`, `mfaRequired`,
//! `redirectURI`, ...). Response types default every field so that partial
//! bodies, such as the error body of a 401, still decode.

use crate::error::ApiError;
use crate::session::SessionToken;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `GET /userinfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub login: String,
    pub role: String,
    #[serde(rename = "userType")]
    pub user_type: String,
}

/// Raw outcome of the identity check.
///
/// Any HTTP status is a valid outcome; only transport failures are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCheck {
    /// HTTP status of the `/userinfo` response.
    pub status: u16,
    /// Leniently decoded body. Empty when the body was not JSON.
    pub info: UserInfo,
}

impl IdentityCheck {
    /// Creates an outcome.
    #[must_use]
    pub fn new(status: u16, info: UserInfo) -> Self {
        Self { status, info }
    }

    /// Returns true if the token was accepted (HTTP 200).
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.status == 200
    }

    /// Returns true if the backend failed rather than judged the token.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// An MFA factor name and the code entered for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorResponse {
    pub name: String,
    pub code: String,
}

/// Body of `POST /auth`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
    #[serde(rename = "factorResponse")]
    pub factor_response: FactorResponse,
}

/// Body returned by `POST /auth` and by the federation token exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub token: SessionToken,
    #[serde(rename = "mfaRequired")]
    pub mfa_required: bool,
    pub factors: Vec<String>,
    pub suspended: bool,
    #[serde(rename = "noLicense")]
    pub no_license: bool,
}

/// Body of `POST /authmethods/{type}/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenExchangeRequest {
    pub code: String,
    pub state: String,
    #[serde(rename = "redirectURI")]
    pub redirect_uri: String,
}

/// A federation provider as listed by `/authmethods`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthMethodsProvider {
    pub id: String,
    pub name: String,
    #[serde(rename = "redirectURI", skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// Body of `GET /authmethods`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthMethods {
    #[serde(rename = "localAuthDisabled")]
    pub local_auth_disabled: bool,
    #[serde(rename = "oidcProviders", deserialize_with = "null_as_empty")]
    pub oidc_providers: Vec<AuthMethodsProvider>,
}

impl AuthMethods {
    /// Returns true if the password form is offered.
    #[must_use]
    pub fn offers_local_login(&self) -> bool {
        !self.local_auth_disabled
    }

    /// Returns true if at least one federation provider is configured.
    #[must_use]
    pub fn has_providers(&self) -> bool {
        !self.oidc_providers.is_empty()
    }
}

// The backend marshals an empty provider list as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<AuthMethodsProvider>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<AuthMethodsProvider>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Transport for the backend's auth endpoints.
///
/// Futures are not `Send`: in the browser they wrap `fetch` promises.
#[async_trait(?Send)]
pub trait AuthApi {
    /// `GET /userinfo` with `token` as bearer credential.
    async fn user_info(&self, token: &SessionToken) -> Result<IdentityCheck, ApiError>;

    /// `POST /auth`.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST /authmethods/{method}/{id}`.
    async fn exchange_code(
        &self,
        method: &str,
        id: &str,
        request: &TokenExchangeRequest,
    ) -> Result<LoginResponse, ApiError>;

    /// `GET /authmethods/{method}/{id}`.
    async fn provider_redirect(
        &self,
        method: &str,
        id: &str,
    ) -> Result<AuthMethodsProvider, ApiError>;

    /// `GET /authmethods`.
    async fn auth_methods(&self) -> Result<AuthMethods, ApiError>;
}
