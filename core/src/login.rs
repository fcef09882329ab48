//! Login and logout.
//!
//! These are the only operations that write the session. A password login
//! reads the bearer token from the `Token` response header and keeps the
//! `Set-Cookie` pairs; a token login just installs the token and asks the
//! server who it belongs to.

use serde::Serialize;
use serde_json::Value;

use crate::backend::HttpBackend;
use crate::endpoints::{Call, GET_USER, LOGIN, LOGOUT};
use crate::error::ApiError;
use crate::transport::{decode, Transport};

/// How to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Password {
        login_id: String,
        password: String,
        /// One-time MFA code, when the account requires it.
        mfa_token: Option<String>,
    },
    /// Personal access token or bot token.
    Token(String),
}

#[derive(Serialize)]
struct LoginBody<'a> {
    login_id: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

impl<B: HttpBackend> Transport<B> {
    /// Authenticate and record the user's id and username.
    ///
    /// Returns the user object sent by the server.
    pub fn login(&mut self, credentials: &Credentials) -> Result<Value, ApiError> {
        let user = match credentials {
            Credentials::Token(token) => {
                self.set_token(token.as_str());
                self.call(&GET_USER, &[("user_id", "me")], Call::default())?
            }
            Credentials::Password {
                login_id,
                password,
                mfa_token,
            } => {
                let body = serde_json::to_value(LoginBody {
                    login_id,
                    password,
                    token: mfa_token.as_deref(),
                })
                .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                let response = self.make_request(LOGIN.method.as_str(), LOGIN.path, Some(&body), None, None)?;

                let token = response
                    .header("Token")
                    .ok_or_else(|| ApiError::MissingHeader("Token".to_string()))?
                    .to_string();
                let cookies: Vec<&str> = response
                    .headers_named("Set-Cookie")
                    .filter_map(|c| c.split(';').next())
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .collect();
                let cookie = (!cookies.is_empty()).then(|| cookies.join("; "));

                self.set_token(token);
                self.set_cookie(cookie);
                decode(response)?
            }
        };

        self.set_user_id(string_field(&user, "id"));
        self.set_username(string_field(&user, "username"));
        tracing::debug!(user_id = self.user_id(), username = self.username(), "logged in");
        Ok(user)
    }

    /// Invalidate the session on the server, then forget it locally.
    pub fn logout(&mut self) -> Result<Value, ApiError> {
        let result = self.call(&LOGOUT, &[], Call::default())?;
        self.clear_session();
        Ok(result)
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
