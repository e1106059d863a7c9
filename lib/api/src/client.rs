//! `reqwest` implementation of the console's transport traits.

use crate::config::{ClientConfig, ConfigError};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use vpn_console_platform_access::{
    ApiError, AuthApi, AuthMethods, AuthMethodsProvider, IdentityCheck, LoginRequest,
    LoginResponse, SessionToken, TokenExchangeRequest, UpgradeApi, UpgradeStatus, UserInfo,
};

/// Client for the appliance's admin API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> vpn_console_core::Result<Self, ConfigError> {
        let base_url =
            Url::parse(config.api_base_url()).map_err(|_| ConfigError::InvalidBaseUrl {
                url: config.api_base_url().to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: config.api_base_url().to_string(),
            }
            .into());
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::ClientBuild {
                details: e.to_string(),
            })?;
        Ok(Self { http, base_url })
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL of an endpoint. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects bases that cannot carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn request_error(err: reqwest::Error) -> ApiError {
    ApiError::Request {
        details: err.to_string(),
    }
}

/// Sends a request and returns the status and raw body.
async fn send(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ApiError> {
    let response = request.send().await.map_err(request_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(request_error)?;
    debug!(status = status.as_u16(), "API response");
    Ok((status, body.to_vec()))
}

/// Sends a request and decodes a JSON body from a 2xx response.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let (status, body) = send(request).await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
        details: e.to_string(),
    })
}

#[async_trait(?Send)]
impl AuthApi for ApiClient {
    #[instrument(skip(self, token))]
    async fn user_info(&self, token: &SessionToken) -> Result<IdentityCheck, ApiError> {
        let request = self
            .http
            .get(self.endpoint(&["userinfo"]))
            .header(AUTHORIZATION, token.bearer());
        let (status, body) = send(request).await?;

        let info = if status == StatusCode::OK {
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
                details: e.to_string(),
            })?
        } else {
            // Error bodies are not guaranteed to be JSON.
            serde_json::from_slice::<UserInfo>(&body).unwrap_or_default()
        };
        Ok(IdentityCheck::new(status.as_u16(), info))
    }

    #[instrument(skip(self, request), fields(login = %request.login))]
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        send_json(self.http.post(self.endpoint(&["auth"])).json(request)).await
    }

    #[instrument(skip(self, request))]
    async fn exchange_code(
        &self,
        method: &str,
        id: &str,
        request: &TokenExchangeRequest,
    ) -> Result<LoginResponse, ApiError> {
        send_json(
            self.http
                .post(self.endpoint(&["authmethods", method, id]))
                .json(request),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn provider_redirect(
        &self,
        method: &str,
        id: &str,
    ) -> Result<AuthMethodsProvider, ApiError> {
        send_json(self.http.get(self.endpoint(&["authmethods", method, id]))).await
    }

    #[instrument(skip(self))]
    async fn auth_methods(&self) -> Result<AuthMethods, ApiError> {
        send_json(self.http.get(self.endpoint(&["authmethods"]))).await
    }
}

#[async_trait(?Send)]
impl UpgradeApi for ApiClient {
    #[instrument(skip(self, token))]
    async fn upgrade_status(&self, token: &SessionToken) -> Result<UpgradeStatus, ApiError> {
        send_json(
            self.http
                .get(self.endpoint(&["upgrade"]))
                .header(AUTHORIZATION, token.bearer()),
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn start_upgrade(&self, token: &SessionToken) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.endpoint(&["upgrade"]))
            .header(AUTHORIZATION, token.bearer())
            .json(&serde_json::json!({}));
        let (status, body) = send(request).await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use vpn_console_platform_access::{
        FactorResponse, MemoryTokenStore, RouteIntent, SessionController, Branch, TOKEN_COOKIE,
        TokenStore, resolve_redirect,
    };

    const ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn client(server: &MockServer) -> ApiClient {
        let config = ClientConfig::new(&server.url("/api")).expect("config");
        ApiClient::new(&config).expect("client")
    }

    #[test]
    fn endpoint_encodes_segments() {
        let config = ClientConfig::new("https://vpn.example.com/api/").expect("config");
        let client = ApiClient::new(&config).expect("client");
        assert_eq!(
            client.endpoint(&["authmethods", "oidc", "a b"]).as_str(),
            "https://vpn.example.com/api/authmethods/oidc/a%20b"
        );
    }

    #[tokio::test]
    async fn user_info_sends_bearer_and_decodes_identity() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/userinfo")
                    .header("authorization", "Bearer abc123");
                then.status(200).json_body(json!({
                    "login": "alice", "role": "admin", "userType": "local"
                }));
            })
            .await;

        let check = client(&server)
            .user_info(&SessionToken::from("abc123"))
            .await
            .expect("user info");

        mock.assert_async().await;
        assert!(check.is_authorized());
        assert_eq!(check.info.login, "alice");
        assert_eq!(check.info.user_type, "local");
    }

    #[tokio::test]
    async fn user_info_unauthorized_is_an_outcome() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/userinfo");
                then.status(401).body("token invalid");
            })
            .await;

        let check = client(&server)
            .user_info(&SessionToken::default())
            .await
            .expect("user info");

        assert_eq!(check, IdentityCheck::new(401, UserInfo::default()));
    }

    #[tokio::test]
    async fn user_info_rejects_malformed_success_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/userinfo");
                then.status(200).body("<html>");
            })
            .await;

        let err = client(&server)
            .user_info(&SessionToken::from("abc"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth").json_body(json!({
                    "login": "admin",
                    "password": "hunter2",
                    "factorResponse": {"name": "", "code": ""}
                }));
                then.status(200)
                    .json_body(json!({"authenticated": true, "token": "tok"}));
            })
            .await;

        let response = client(&server)
            .login(&LoginRequest {
                login: "admin".to_string(),
                password: "hunter2".to_string(),
                factor_response: FactorResponse::default(),
            })
            .await
            .expect("login");

        mock.assert_async().await;
        assert_eq!(response.token.as_str(), "tok");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth");
                then.status(429).body("slow down");
            })
            .await;

        let err = client(&server)
            .login(&LoginRequest::default())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Status {
                status: 429,
                body: "slow down".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn exchange_code_posts_to_provider() {
        let server = MockServer::start_async().await;
        let path = format!("/callback/oidc/{ID}");
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/api/authmethods/oidc/{ID}"))
                    .json_body(json!({"code": "xyz", "state": "s1", "redirectURI": path}));
                then.status(200)
                    .json_body(json!({"authenticated": true, "token": "fed"}));
            })
            .await;

        let response = client(&server)
            .exchange_code(
                "oidc",
                ID,
                &TokenExchangeRequest {
                    code: "xyz".to_string(),
                    state: "s1".to_string(),
                    redirect_uri: path.clone(),
                },
            )
            .await
            .expect("exchange");

        mock.assert_hits_async(1).await;
        assert_eq!(response.token.as_str(), "fed");
    }

    #[tokio::test]
    async fn redirect_resolution_hits_backend_once() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/authmethods/saml/{ID}"));
                then.status(200).json_body(json!({
                    "id": ID, "name": "Corp IdP", "redirectURI": "https://idp.example.com/sso"
                }));
            })
            .await;
        let api = client(&server);

        let uri = resolve_redirect(&api, "saml", ID).await.expect("redirect");
        assert_eq!(uri, "https://idp.example.com/sso");

        let invalid = resolve_redirect(&api, "saml", "not-a-uuid").await;
        assert!(invalid.is_err());

        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn auth_methods_lists_providers() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/authmethods");
                then.status(200).json_body(json!({
                    "localAuthDisabled": false,
                    "oidcProviders": [{"id": "p1", "name": "Okta"}]
                }));
            })
            .await;

        let methods = client(&server).auth_methods().await.expect("methods");

        assert!(methods.offers_local_login());
        assert_eq!(methods.oidc_providers[0].name, "Okta");
    }

    #[tokio::test]
    async fn upgrade_endpoints_require_bearer() {
        let server = MockServer::start_async().await;
        let status = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/upgrade")
                    .header("authorization", "Bearer admin-token");
                then.status(200).json_body(json!({
                    "currentVersion": "v1.1.0",
                    "newVersionAvailable": true,
                    "newVersion": "v1.2.0"
                }));
            })
            .await;
        let start = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/upgrade")
                    .header("authorization", "Bearer admin-token");
                then.status(202);
            })
            .await;
        let api = client(&server);
        let token = SessionToken::from("admin-token");

        let current = api.upgrade_status(&token).await.expect("status");
        api.start_upgrade(&token).await.expect("start");

        status.assert_async().await;
        start.assert_async().await;
        assert_eq!(current.new_version, "v1.2.0");
    }

    #[tokio::test]
    async fn session_controller_against_http_backend() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/userinfo")
                    .header("authorization", "Bearer abc123");
                then.status(200).json_body(json!({
                    "login": "alice", "role": "admin", "userType": "local"
                }));
            })
            .await;
        let store = MemoryTokenStore::with_token("abc123");
        let mut controller = SessionController::new(&store);

        controller.resolve(&client(&server)).await.expect("resolve");

        assert_eq!(
            controller.branch(&RouteIntent::from_path("/")),
            Branch::Authenticated
        );
        assert_eq!(store.get(TOKEN_COOKIE).as_deref(), Some("abc123"));
    }
}
