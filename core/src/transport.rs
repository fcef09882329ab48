//! Request pipeline for the chat API.
//!
//! # Design
//! `Transport` owns the connection configuration, the session, and an
//! `HttpBackend`. Every call funnels through `make_request`:
//!
//! 1. resolve the method name (unknown names become GET),
//! 2. append the endpoint path to the configured base URL,
//! 3. attach `Authorization: Bearer <token>` when a token is set,
//! 4. attach query parameters and the body,
//! 5. execute, and turn a non-2xx response into an `ApiError`.
//!
//! Request composition (`build_request`) is pure so it can be checked
//! without a network. The transport never retries, caches or rate-limits.

use serde_json::Value;

use crate::backend::{HttpBackend, UreqBackend};
use crate::config::ConnectionConfig;
use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, RequestData};
use crate::session::Session;

/// Query parameters as borrowed key/value pairs.
pub type Params<'a> = &'a [(&'a str, &'a str)];

/// Blocking client for one logical session.
pub struct Transport<B = UreqBackend> {
    config: ConnectionConfig,
    base_url: String,
    session: Session,
    backend: B,
}

impl Transport<UreqBackend> {
    /// Create a transport that talks to the network through ureq, honoring
    /// `config.verify` for TLS.
    pub fn new(config: ConnectionConfig) -> Self {
        let backend = UreqBackend::new(config.verify);
        Self::with_backend(config, backend)
    }
}

impl<B: HttpBackend> Transport<B> {
    pub fn with_backend(config: ConnectionConfig, backend: B) -> Self {
        let base_url = config.base_url();
        Self {
            config,
            base_url,
            session: Session::new(),
            backend,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Composed base URL every endpoint path is appended to.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> &str {
        self.session.token()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.session.set_token(token);
    }

    pub fn cookie(&self) -> Option<&str> {
        self.session.cookie()
    }

    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.session.set_cookie(cookie);
    }

    pub fn user_id(&self) -> &str {
        self.session.user_id()
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.session.set_user_id(user_id);
    }

    pub fn username(&self) -> &str {
        self.session.username()
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.session.set_username(username);
    }

    pub fn clear_session(&mut self) {
        self.session.clear();
    }

    /// Compose a request without sending it.
    ///
    /// Non-empty `data` takes precedence over the JSON `options` body. With
    /// neither, the request carries no body at all; pass `Some(&json!({}))`
    /// to send `{}`.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        options: Option<&Value>,
        params: Option<Params<'_>>,
        data: Option<&RequestData>,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = Vec::new();
        if let Some(auth) = self.session.auth_header() {
            headers.push(("Authorization".to_string(), auth));
        }

        let query = params
            .unwrap_or_default()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let body = match (data, options) {
            (Some(data), _) if !data.is_empty() => Some(encode_data(data)),
            (_, Some(options)) => {
                let json = serde_json::to_string(options)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                Some(HttpBody::Json(json))
            }
            _ => None,
        };

        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            query,
            body,
        })
    }

    /// Execute one request and return the raw response on success.
    ///
    /// `method` is matched case-insensitively; unrecognized names are sent
    /// as GET.
    pub fn make_request(
        &self,
        method: &str,
        endpoint: &str,
        options: Option<&Value>,
        params: Option<Params<'_>>,
        data: Option<&RequestData>,
    ) -> Result<HttpResponse, ApiError> {
        let method = HttpMethod::from_name(method);
        let request = self.build_request(method, endpoint, options, params, data)?;
        tracing::debug!(method = method.as_str(), url = %request.url, "sending request");

        let response = self.backend.execute(&request)?;
        check_status(&response)?;

        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => tracing::debug!(status = response.status, body = %value, "response"),
            Err(_) => tracing::debug!(status = response.status, "response body is not JSON"),
        }
        Ok(response)
    }

    pub fn get(
        &self,
        endpoint: &str,
        options: Option<&Value>,
        params: Option<Params<'_>>,
    ) -> Result<Value, ApiError> {
        decode(self.make_request("get", endpoint, options, params, None)?)
    }

    pub fn post(
        &self,
        endpoint: &str,
        options: Option<&Value>,
        params: Option<Params<'_>>,
        data: Option<&RequestData>,
    ) -> Result<Value, ApiError> {
        decode(self.make_request("post", endpoint, options, params, data)?)
    }

    pub fn put(
        &self,
        endpoint: &str,
        options: Option<&Value>,
        params: Option<Params<'_>>,
        data: Option<&RequestData>,
    ) -> Result<Value, ApiError> {
        decode(self.make_request("put", endpoint, options, params, data)?)
    }

    pub fn delete(
        &self,
        endpoint: &str,
        options: Option<&Value>,
        params: Option<Params<'_>>,
        data: Option<&RequestData>,
    ) -> Result<Value, ApiError> {
        decode(self.make_request("delete", endpoint, options, params, data)?)
    }
}

/// Map a non-2xx response to the matching `ApiError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::classify(response.status, &response.body))
}

pub(crate) fn decode(response: HttpResponse) -> Result<Value, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn encode_data(data: &RequestData) -> HttpBody {
    match data {
        RequestData::Form(pairs) => HttpBody::Form(
            url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter())
                .finish(),
        ),
        RequestData::Raw(bytes) => HttpBody::Raw(bytes.clone()),
    }
}
