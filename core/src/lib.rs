//! Blocking client binding for the chat platform's REST API.
//!
//! # Overview
//! `Transport` is the one component with behavior: it composes each request
//! from the connection configuration and the current session, executes it
//! through an `HttpBackend`, and turns failures into typed `ApiError`s using
//! the server's `{status_code, message}` error envelope.
//!
//! # Design
//! - Requests and responses are plain data (`http`), so composition and
//!   classification are testable without a server.
//! - `UreqBackend` performs the actual blocking I/O.
//! - Session state lives in `Session` and only changes through
//!   `&mut Transport` (setters, `login`, `logout`).
//! - Endpoint wrappers are rows in the `endpoints` table driven by
//!   `Transport::call`, not hand-written request code.

pub mod backend;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod login;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use backend::{HttpBackend, UreqBackend};
pub use config::{ConnectionConfig, Scheme};
pub use endpoints::{Call, Endpoint, Ldap};
pub use error::{ApiError, ErrorEnvelope};
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, RequestData};
pub use login::Credentials;
pub use session::Session;
pub use transport::{Params, Transport};
