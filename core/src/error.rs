//! Error types for the chat API transport.
//!
//! # Design
//! Six HTTP statuses get dedicated variants because the server describes them
//! in its own JSON envelope (`{"status_code": .., "message": ..}`) and callers
//! routinely branch on them. Classification keys off the envelope's
//! `status_code`, not the HTTP status line. Any other non-2xx response, or a
//! failure body that is not a valid envelope, lands in `HttpError` with the
//! raw status and body untouched.

use serde::Deserialize;
use thiserror::Error;

/// The server's JSON body for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    pub status_code: i64,
    pub message: String,
}

/// Errors returned by `Transport` and the endpoint helpers built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: invalid or missing parameters in URL or request body.
    #[error("invalid or missing parameters: {message}")]
    InvalidOrMissingParameters { status: u16, message: String },

    /// 401: no access token provided.
    #[error("no access token provided: {message}")]
    NoAccessTokenProvided { status: u16, message: String },

    /// 403: the session lacks the required permissions.
    #[error("not enough permissions: {message}")]
    NotEnoughPermissions { status: u16, message: String },

    /// 404: the requested resource does not exist.
    #[error("resource not found: {message}")]
    ResourceNotFound { status: u16, message: String },

    /// 413: request content too large.
    #[error("content too large: {message}")]
    ContentTooLarge { status: u16, message: String },

    /// 501: the feature is disabled on the server.
    #[error("feature disabled: {message}")]
    FeatureDisabled { status: u16, message: String },

    /// Any other non-2xx response, passed through unchanged.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// A success body could not be decoded as JSON.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A request payload could not be encoded.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The HTTP exchange itself failed (DNS, TLS, connection reset, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// An endpoint path template referenced a placeholder with no value.
    #[error("missing path parameter `{0}`")]
    MissingPathParameter(String),

    /// A response lacked a header the caller depends on.
    #[error("missing response header `{0}`")]
    MissingHeader(String),
}

impl ApiError {
    /// Map a failed response to its error kind.
    ///
    /// The kind follows the envelope's `status_code`; `status` is the HTTP
    /// status line and is carried by every variant.
    pub fn classify(status: u16, body: &str) -> Self {
        let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
            return ApiError::HttpError {
                status,
                body: body.to_string(),
            };
        };
        let message = envelope.message;
        match envelope.status_code {
            400 => ApiError::InvalidOrMissingParameters { status, message },
            401 => ApiError::NoAccessTokenProvided { status, message },
            403 => ApiError::NotEnoughPermissions { status, message },
            404 => ApiError::ResourceNotFound { status, message },
            413 => ApiError::ContentTooLarge { status, message },
            501 => ApiError::FeatureDisabled { status, message },
            _ => ApiError::HttpError {
                status,
                body: body.to_string(),
            },
        }
    }

    /// HTTP status line captured when an HTTP failure was raised.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidOrMissingParameters { status, .. }
            | ApiError::NoAccessTokenProvided { status, .. }
            | ApiError::NotEnoughPermissions { status, .. }
            | ApiError::ResourceNotFound { status, .. }
            | ApiError::ContentTooLarge { status, .. }
            | ApiError::FeatureDisabled { status, .. }
            | ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server message for the six classified kinds.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::InvalidOrMissingParameters { message, .. }
            | ApiError::NoAccessTokenProvided { message, .. }
            | ApiError::NotEnoughPermissions { message, .. }
            | ApiError::ResourceNotFound { message, .. }
            | ApiError::ContentTooLarge { message, .. }
            | ApiError::FeatureDisabled { message, .. } => Some(message),
            _ => None,
        }
    }

    /// True for every kind produced by a non-2xx response.
    pub fn is_http_failure(&self) -> bool {
        self.status().is_some()
    }
}
