//! Forwarding of `/api` to the admin API.
//!
//! The console talks to the API on its own origin. In development, or when
//! the console is served separately from the appliance, the server forwards
//! those requests to the configured upstream.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderName, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};
use vpn_console_api::ConfigError;

/// Request headers passed through to the upstream.
const FORWARDED_HEADERS: [HeaderName; 3] =
    [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

/// Largest request body that is forwarded.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Forwards requests to an upstream API.
#[derive(Debug, Clone)]
pub struct ApiProxy {
    http: reqwest::Client,
    upstream: String,
}

impl ApiProxy {
    /// Creates a proxy for a normalized upstream base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(upstream: String) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::ClientBuild {
                details: e.to_string(),
            })?;
        Ok(Self { http, upstream })
    }

    /// Router that forwards every request it receives. Mount it with
    /// `nest_service` so the mount prefix is stripped.
    pub fn router(self) -> Router {
        Router::new().fallback(forward).with_state(self)
    }

    fn target(&self, uri: &Uri) -> String {
        let path = uri.path_and_query().map_or("/", |p| p.as_str());
        format!("{}{}", self.upstream, path)
    }
}

async fn forward(State(proxy): State<ApiProxy>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response(),
    };

    let target = proxy.target(&parts.uri);
    debug!(method = %parts.method, %target, "forwarding API request");

    let mut upstream = proxy.http.request(parts.method, &target).body(body);
    for name in FORWARDED_HEADERS {
        if let Some(value) = parts.headers.get(&name) {
            upstream = upstream.header(name, value.clone());
        }
    }

    let response = match upstream.send().await {
        Ok(response) => response,
        Err(e) => return bad_gateway(&target, &e),
    };
    let status = response.status();
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return bad_gateway(&target, &e),
    };

    let mut response = (status, Body::from(bytes)).into_response();
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }
    response
}

fn bad_gateway(target: &str, err: &reqwest::Error) -> Response {
    warn!(%target, error = %err, "API upstream unreachable");
    (StatusCode::BAD_GATEWAY, "API upstream unreachable").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tower::ServiceExt;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf-8")
    }

    #[tokio::test]
    async fn forwards_path_query_and_authorization() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/userinfo")
                    .query_param("fresh", "1")
                    .header("authorization", "Bearer abc");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"login":"alice"}"#);
            })
            .await;

        let proxy = ApiProxy::new(server.url("/api")).expect("proxy");
        let request = Request::builder()
            .uri("/userinfo?fresh=1")
            .header(header::AUTHORIZATION, "Bearer abc")
            .body(Body::empty())
            .expect("request");
        let response = proxy.router().oneshot(request).await.expect("response");

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"application/json"[..])
        );
        assert_eq!(body_text(response).await, r#"{"login":"alice"}"#);
    }

    #[tokio::test]
    async fn passes_upstream_errors_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth").body(r#"{"login":"bob"}"#);
                then.status(401).body("unauthorized");
            })
            .await;

        let proxy = ApiProxy::new(server.base_url()).expect("proxy");
        let request = Request::builder()
            .method("POST")
            .uri("/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"login":"bob"}"#))
            .expect("request");
        let response = proxy.router().oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "unauthorized");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_bad_gateway() {
        let proxy = ApiProxy::new("http://127.0.0.1:1".to_string()).expect("proxy");
        let request = Request::builder()
            .uri("/userinfo")
            .body(Body::empty())
            .expect("request");
        let response = proxy.router().oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
