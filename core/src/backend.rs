//! Executes `HttpRequest` values against the network.
//!
//! `UreqBackend` is the blocking implementation used by `Transport::new`.
//! Status codes are returned as data (`http_status_as_error(false)`) so
//! classification stays in the transport.

use ureq::tls::TlsConfig;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};

/// Something that can perform one HTTP round-trip.
pub trait HttpBackend {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<B: HttpBackend + ?Sized> HttpBackend for &B {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking backend over a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqBackend {
    agent: Agent,
}

impl UreqBackend {
    /// `verify = false` disables TLS certificate verification.
    pub fn new(verify: bool) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(TlsConfig::builder().disable_verification(!verify).build())
            .build()
            .new_agent();
        Self { agent }
    }
}

impl HttpBackend for UreqBackend {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let result = match request.method {
            HttpMethod::Get => send_without_body(self.agent.get(&request.url), request),
            HttpMethod::Delete => send_without_body(self.agent.delete(&request.url), request),
            HttpMethod::Post => send_with_body(self.agent.post(&request.url), request),
            HttpMethod::Put => send_with_body(self.agent.put(&request.url), request),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // Failure bodies are not guaranteed to be UTF-8 or small.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn apply_parts<T>(mut builder: RequestBuilder<T>, request: &HttpRequest) -> RequestBuilder<T> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (key, value) in &request.query {
        builder = builder.query(key, value);
    }
    builder
}

fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let builder = apply_parts(builder, request);
    match &request.body {
        None => builder.call(),
        Some(body) => send_body(builder.force_send_body(), body),
    }
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let builder = apply_parts(builder, request);
    match &request.body {
        None => builder.send_empty(),
        Some(body) => send_body(builder, body),
    }
}

fn send_body(
    builder: RequestBuilder<WithBody>,
    body: &HttpBody,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    builder.content_type(body.content_type()).send(body.as_bytes())
}
