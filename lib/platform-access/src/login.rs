//! Local login: password, optional MFA factor, and the login page's
//! provider-error banner.

use crate::auth::{AuthApi, FactorResponse, LoginRequest, LoginResponse};
use crate::error::{ApiError, LoginError};
use crate::session::SessionToken;
use tracing::{debug, warn};

/// What a login attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The backend issued a session token.
    Authenticated(SessionToken),
    /// The password was accepted; one of these factors must be answered.
    FactorRequired(Vec<String>),
}

/// State of the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    login: String,
    password: String,
    factors: Vec<String>,
    factor: FactorResponse,
}

impl LoginForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_login(&mut self, login: impl Into<String>) {
        self.login = login.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Factors the backend asked for. Empty until MFA is required.
    #[must_use]
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Returns true once the form asks for an MFA code.
    #[must_use]
    pub fn needs_factor(&self) -> bool {
        !self.factors.is_empty()
    }

    /// Currently selected factor and code.
    #[must_use]
    pub fn factor(&self) -> &FactorResponse {
        &self.factor
    }

    /// Switches the form to MFA entry. The first factor is preselected.
    pub fn require_factors(&mut self, factors: Vec<String>) {
        self.factor = FactorResponse {
            name: factors.first().cloned().unwrap_or_default(),
            code: String::new(),
        };
        self.factors = factors;
    }

    pub fn select_factor(&mut self, name: impl Into<String>) {
        self.factor.name = name.into();
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.factor.code = code.into();
    }

    /// Builds the `POST /auth` body from the form.
    #[must_use]
    pub fn request(&self) -> LoginRequest {
        LoginRequest {
            login: self.login.clone(),
            password: self.password.clone(),
            factor_response: self.factor.clone(),
        }
    }

    /// Applies an outcome to the form and returns the token, if any.
    pub fn apply(&mut self, outcome: LoginOutcome) -> Option<SessionToken> {
        match outcome {
            LoginOutcome::Authenticated(token) => Some(token),
            LoginOutcome::FactorRequired(factors) => {
                self.require_factors(factors);
                None
            }
        }
    }
}

/// Maps a `POST /auth` result to an outcome.
///
/// # Errors
///
/// Returns `InvalidCredentials` on HTTP 401, `TooManyAttempts` on HTTP 429
/// and `Other` for any other failure, including a response without a token.
pub fn login_outcome(result: Result<LoginResponse, ApiError>) -> Result<LoginOutcome, LoginError> {
    match result {
        Ok(response) if response.mfa_required => {
            debug!(factors = response.factors.len(), "login requires a second factor");
            Ok(LoginOutcome::FactorRequired(response.factors))
        }
        Ok(response) if response.token.is_empty() => {
            warn!(authenticated = response.authenticated, "login returned no token");
            Err(LoginError::Other {
                details: "no session token was returned".to_string(),
            })
        }
        Ok(response) => Ok(LoginOutcome::Authenticated(response.token)),
        Err(err) => {
            warn!(error = %err, "login failed");
            Err(match err.status() {
                Some(401) => LoginError::InvalidCredentials,
                Some(429) => LoginError::TooManyAttempts,
                _ => LoginError::Other {
                    details: err.to_string(),
                },
            })
        }
    }
}

/// Submits the form's credentials.
///
/// # Errors
///
/// See [`login_outcome`].
pub async fn submit_login<A>(api: &A, request: &LoginRequest) -> Result<LoginOutcome, LoginError>
where
    A: AuthApi + ?Sized,
{
    login_outcome(api.login(request).await)
}

/// Message for the `error` and `error_description` query parameters a
/// provider appends when it sends the user back to the login page.
#[must_use]
pub fn provider_error_message(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut error = None;
    let mut description = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "error" if error.is_none() => error = Some(value.into_owned()),
            "error_description" if description.is_none() => description = Some(value.into_owned()),
            _ => {}
        }
    }
    let error = error?;
    Some(match description {
        Some(description) => format!("An error occured: {error}: {description}"),
        None => format!("An error occured: {error}"),
    })
}
