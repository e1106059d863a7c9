//! Scripted `AuthApi` for unit tests.

use crate::auth::{
    AuthApi, AuthMethods, AuthMethodsProvider, IdentityCheck, LoginRequest, LoginResponse,
    TokenExchangeRequest, UserInfo,
};
use crate::error::ApiError;
use crate::session::SessionToken;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// A request the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    UserInfo(String),
    Login(LoginRequest),
    Exchange {
        method: String,
        id: String,
        request: TokenExchangeRequest,
    },
    Redirect {
        method: String,
        id: String,
    },
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        body: String::new(),
    }
}

/// Answers `/userinfo` with 200 for known tokens and 401 otherwise. Login,
/// exchange and redirect answer from a script, falling back to a 500;
/// `/authmethods` always fails.
#[derive(Debug, Default)]
pub(crate) struct FakeAuthApi {
    users: HashMap<String, UserInfo>,
    logins: RefCell<VecDeque<Result<LoginResponse, ApiError>>>,
    exchange: Option<Result<LoginResponse, ApiError>>,
    redirect: Option<Result<AuthMethodsProvider, ApiError>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeAuthApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(mut self, token: &str, info: UserInfo) -> Self {
        self.users.insert(token.to_string(), info);
        self
    }

    pub(crate) fn with_login(self, response: Result<LoginResponse, ApiError>) -> Self {
        self.logins.borrow_mut().push_back(response);
        self
    }

    pub(crate) fn with_exchange(mut self, response: Result<LoginResponse, ApiError>) -> Self {
        self.exchange = Some(response);
        self
    }

    pub(crate) fn with_redirect(mut self, response: Result<AuthMethodsProvider, ApiError>) -> Self {
        self.redirect = Some(response);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait(?Send)]
impl AuthApi for FakeAuthApi {
    async fn user_info(&self, token: &SessionToken) -> Result<IdentityCheck, ApiError> {
        self.record(Call::UserInfo(token.as_str().to_string()));
        Ok(match self.users.get(token.as_str()) {
            Some(info) => IdentityCheck::new(200, info.clone()),
            None => IdentityCheck::new(401, UserInfo::default()),
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.record(Call::Login(request.clone()));
        self.logins
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(server_error()))
    }

    async fn exchange_code(
        &self,
        method: &str,
        id: &str,
        request: &TokenExchangeRequest,
    ) -> Result<LoginResponse, ApiError> {
        self.record(Call::Exchange {
            method: method.to_string(),
            id: id.to_string(),
            request: request.clone(),
        });
        self.exchange.clone().unwrap_or_else(|| Err(server_error()))
    }

    async fn provider_redirect(
        &self,
        method: &str,
        id: &str,
    ) -> Result<AuthMethodsProvider, ApiError> {
        self.record(Call::Redirect {
            method: method.to_string(),
            id: id.to_string(),
        });
        self.redirect.clone().unwrap_or_else(|| Err(server_error()))
    }

    async fn auth_methods(&self) -> Result<AuthMethods, ApiError> {
        Err(server_error())
    }
}
