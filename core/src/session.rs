//! Authentication context carried by a `Transport`.
//!
//! # Design
//! One `Session` per transport. The login flow is the only writer in
//! practice; the request pipeline reads `auth_header` for every call. Mutation
//! goes through `&mut Transport`, so an instance is never shared between
//! logical sessions.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: String,
    cookie: Option<String>,
    user_id: String,
    username: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id = user_id.into();
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    /// An empty token means unauthenticated.
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Value for the `Authorization` header, if a token is set.
    pub fn auth_header(&self) -> Option<String> {
        if self.token.is_empty() {
            return None;
        }
        Some(format!("Bearer {}", self.token))
    }

    /// Drop token, cookie and identity.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
