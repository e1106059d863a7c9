//! Federation (OIDC and SAML) login legs.
//!
//! The console never speaks OIDC or SAML itself. It relays opaque values:
//! on `/login/:type/:id` it asks the backend where the provider lives and
//! sends the browser there; on `/callback/:type/:id` it hands the returned
//! `code` and `state` to the backend and receives a session token.

use crate::auth::{AuthApi, LoginResponse, TokenExchangeRequest};
use crate::error::FederationError;
use crate::session::SessionToken;
use std::fmt;
use tracing::{debug, warn};
use vpn_console_core::ProviderId;

/// Federation protocol named in a login or callback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FederationKind {
    Oidc,
    Saml,
}

impl FederationKind {
    /// Parses the `:type` path segment.
    ///
    /// # Errors
    ///
    /// Returns `FederationError::UnsupportedMethod` for anything other than
    /// `oidc` or `saml`.
    pub fn parse(method: &str) -> Result<Self, FederationError> {
        match method {
            "oidc" => Ok(Self::Oidc),
            "saml" => Ok(Self::Saml),
            other => Err(FederationError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }

    /// Returns the path segment for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Oidc => "oidc",
            Self::Saml => "saml",
        }
    }

    /// Returns the name used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Oidc => "OIDC",
            Self::Saml => "SAML",
        }
    }
}

impl fmt::Display for FederationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `/login/:type/:id` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectTarget {
    pub kind: FederationKind,
    pub id: ProviderId,
}

/// Validates the segments of a login-redirect path.
///
/// # Errors
///
/// Returns `FederationError::UnsupportedMethod` for an unknown `method`, and
/// `FederationError::InvalidProviderId` if `id` is not a UUID.
pub fn validate_redirect(method: &str, id: &str) -> Result<RedirectTarget, FederationError> {
    let kind = FederationKind::parse(method)?;
    let id = id
        .parse::<ProviderId>()
        .map_err(|_| FederationError::InvalidProviderId { label: kind.label() })?;
    Ok(RedirectTarget { kind, id })
}

/// Resolves the provider URL the browser must navigate to.
///
/// An invalid path is rejected before any request is made; otherwise exactly
/// one request is made.
///
/// # Errors
///
/// Returns the validation error, `FederationError::Redirect` if the lookup
/// fails, or `FederationError::EmptyRedirect` if the backend has no URL.
pub async fn resolve_redirect<A>(api: &A, method: &str, id: &str) -> Result<String, FederationError>
where
    A: AuthApi + ?Sized,
{
    let target = validate_redirect(method, id)?;
    let provider = api
        .provider_redirect(target.kind.as_str(), &target.id.to_string())
        .await
        .map_err(|e| {
            warn!(error = %e, kind = %target.kind, "provider redirect lookup failed");
            FederationError::Redirect {
                details: e.to_string(),
            }
        })?;

    match provider.redirect_uri {
        Some(uri) if !uri.is_empty() => {
            debug!(kind = %target.kind, "resolved provider redirect");
            Ok(uri)
        }
        _ => Err(FederationError::EmptyRedirect),
    }
}

/// The token exchange a callback page performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRequest {
    pub method: String,
    pub id: String,
    pub body: TokenExchangeRequest,
}

impl CallbackRequest {
    /// Builds the exchange from the callback location.
    ///
    /// `path` is sent back as `redirectURI`; `query` may include the leading
    /// `?`. Missing `code` or `state` parameters become empty strings.
    #[must_use]
    pub fn from_location(method: &str, id: &str, path: &str, query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut code = None;
        let mut state = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" if code.is_none() => code = Some(value.into_owned()),
                "state" if state.is_none() => state = Some(value.into_owned()),
                _ => {}
            }
        }
        Self {
            method: method.to_string(),
            id: id.to_string(),
            body: TokenExchangeRequest {
                code: code.unwrap_or_default(),
                state: state.unwrap_or_default(),
                redirect_uri: path.to_string(),
            },
        }
    }
}

/// Exchanges the callback's code for a session token with one request.
///
/// # Errors
///
/// Returns `Suspended` or `NoLicense` when the backend says so,
/// `InvalidCredentials` on HTTP 401 and `Exchange` for any other failure.
pub async fn complete_callback<A>(
    api: &A,
    callback: &CallbackRequest,
) -> Result<SessionToken, FederationError>
where
    A: AuthApi + ?Sized,
{
    let response = api
        .exchange_code(&callback.method, &callback.id, &callback.body)
        .await
        .map_err(|e| {
            warn!(error = %e, method = %callback.method, "token exchange failed");
            if e.status() == Some(401) {
                FederationError::InvalidCredentials
            } else {
                FederationError::Exchange {
                    details: e.to_string(),
                }
            }
        })?;
    exchange_outcome(response)
}

fn exchange_outcome(response: LoginResponse) -> Result<SessionToken, FederationError> {
    if response.suspended {
        return Err(FederationError::Suspended);
    }
    if response.no_license {
        return Err(FederationError::NoLicense);
    }
    if response.token.is_empty() {
        warn!(authenticated = response.authenticated, "token exchange returned no token");
        return Err(FederationError::Exchange {
            details: "no session token was returned".to_string(),
        });
    }
    debug!(authenticated = response.authenticated, "token exchange completed");
    Ok(response.token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMethodsProvider;
    use crate::error::ApiError;
    use crate::testing::{Call, FakeAuthApi};

    const ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn provider(uri: Option<&str>) -> AuthMethodsProvider {
        AuthMethodsProvider {
            id: ID.to_string(),
            name: "Okta".to_string(),
            redirect_uri: uri.map(str::to_string),
        }
    }

    #[test]
    fn kind_parsing() {
        assert_eq!(FederationKind::parse("oidc"), Ok(FederationKind::Oidc));
        assert_eq!(FederationKind::parse("saml"), Ok(FederationKind::Saml));
        assert_eq!(
            FederationKind::parse("OIDC"),
            Err(FederationError::UnsupportedMethod {
                method: "OIDC".to_string()
            })
        );
    }

    #[test]
    fn invalid_ids_name_the_protocol() {
        let oidc = validate_redirect("oidc", "not-a-uuid").unwrap_err();
        assert_eq!(oidc.to_string(), "Invalid OIDC method id (expected UUID)");
        let saml = validate_redirect("saml", "not-a-uuid").unwrap_err();
        assert_eq!(saml.to_string(), "Invalid SAML method id (expected UUID)");
    }

    #[test]
    fn unknown_kind_is_checked_before_id() {
        assert!(matches!(
            validate_redirect("ldap", "not-a-uuid"),
            Err(FederationError::UnsupportedMethod { .. })
        ));
    }

    #[test]
    fn valid_redirect_target() {
        let target = validate_redirect("saml", ID).expect("valid");
        assert_eq!(target.kind, FederationKind::Saml);
        assert_eq!(target.id.to_string(), ID);
    }

    #[test]
    fn callback_request_from_location() {
        let path = format!("/callback/oidc/{ID}");
        let request = CallbackRequest::from_location("oidc", ID, &path, "?code=xyz&state=s1");
        assert_eq!(
            request.body,
            TokenExchangeRequest {
                code: "xyz".to_string(),
                state: "s1".to_string(),
                redirect_uri: path,
            }
        );
    }

    #[test]
    fn callback_request_decodes_and_defaults() {
        let request = CallbackRequest::from_location("saml", "x", "/callback/saml/x", "code=a%2Bb");
        assert_eq!(request.body.code, "a+b");
        assert_eq!(request.body.state, "");
    }

    #[tokio::test]
    async fn invalid_redirect_makes_no_call() {
        let api = FakeAuthApi::new().with_redirect(Ok(provider(Some("https://idp"))));

        let err = resolve_redirect(&api, "oidc", "not-a-uuid")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid OIDC method id (expected UUID)");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn valid_redirect_makes_exactly_one_call() {
        let api = FakeAuthApi::new()
            .with_redirect(Ok(provider(Some("https://idp.example.com/authorize"))));

        let uri = resolve_redirect(&api, "oidc", ID).await.expect("redirect");

        assert_eq!(uri, "https://idp.example.com/authorize");
        assert_eq!(
            api.calls(),
            vec![Call::Redirect {
                method: "oidc".to_string(),
                id: ID.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn redirect_id_is_sent_lowercase() {
        let api = FakeAuthApi::new().with_redirect(Ok(provider(Some("https://idp"))));
        resolve_redirect(&api, "oidc", &ID.to_uppercase())
            .await
            .expect("redirect");
        assert_eq!(
            api.calls(),
            vec![Call::Redirect {
                method: "oidc".to_string(),
                id: ID.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn empty_redirect_uri_is_an_error() {
        for uri in [None, Some("")] {
            let api = FakeAuthApi::new().with_redirect(Ok(provider(uri)));
            let err = resolve_redirect(&api, "saml", ID).await.unwrap_err();
            assert_eq!(err, FederationError::EmptyRedirect);
        }
    }

    #[tokio::test]
    async fn callback_exchanges_code_once() {
        let api = FakeAuthApi::new().with_exchange(Ok(LoginResponse {
            authenticated: true,
            token: SessionToken::from("fed-token"),
            ..LoginResponse::default()
        }));
        let path = format!("/callback/oidc/{ID}");
        let callback = CallbackRequest::from_location("oidc", ID, &path, "?code=xyz&state=s1");

        let token = complete_callback(&api, &callback).await.expect("token");

        assert_eq!(token.as_str(), "fed-token");
        assert_eq!(
            api.calls(),
            vec![Call::Exchange {
                method: "oidc".to_string(),
                id: ID.to_string(),
                request: TokenExchangeRequest {
                    code: "xyz".to_string(),
                    state: "s1".to_string(),
                    redirect_uri: path,
                },
            }]
        );
    }

    #[tokio::test]
    async fn callback_reports_suspended_and_no_license() {
        let callback = CallbackRequest::from_location("oidc", ID, "/", "");

        let suspended = FakeAuthApi::new().with_exchange(Ok(LoginResponse {
            suspended: true,
            ..LoginResponse::default()
        }));
        assert_eq!(
            complete_callback(&suspended, &callback).await,
            Err(FederationError::Suspended)
        );

        let no_license = FakeAuthApi::new().with_exchange(Ok(LoginResponse {
            no_license: true,
            ..LoginResponse::default()
        }));
        let err = complete_callback(&no_license, &callback).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "user can't be added, because user license limit has been reached"
        );
    }

    #[tokio::test]
    async fn callback_without_token_is_an_error() {
        let callback = CallbackRequest::from_location("oidc", ID, "/", "?code=xyz&state=s1");
        let api = FakeAuthApi::new().with_exchange(Ok(LoginResponse::default()));

        let err = complete_callback(&api, &callback).await.unwrap_err();

        assert_eq!(err.to_string(), "Error: no session token was returned");
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn callback_maps_http_failures() {
        let callback = CallbackRequest::from_location("saml", ID, "/", "");

        let unauthorized = FakeAuthApi::new().with_exchange(Err(ApiError::Status {
            status: 401,
            body: String::new(),
        }));
        assert_eq!(
            complete_callback(&unauthorized, &callback).await,
            Err(FederationError::InvalidCredentials)
        );

        let broken = FakeAuthApi::new().with_exchange(Err(ApiError::Status {
            status: 502,
            body: String::new(),
        }));
        let err = complete_callback(&broken, &callback).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: Request failed with status code 502");
    }
}
