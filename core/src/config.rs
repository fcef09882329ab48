//! Connection configuration.
//!
//! Set once when a `Transport` is created and never changed afterwards. The
//! struct deserializes from the same JSON options object the server's other
//! drivers accept, with every field but `url` optional.

use std::fmt;

use serde::{Deserialize, Serialize};

/// URL scheme used to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how to connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_scheme")]
    pub scheme: Scheme,
    /// Host name, optionally with `:port` when the server is not on the
    /// scheme's default port.
    pub url: String,
    #[serde(default = "default_basepath")]
    pub basepath: String,
    /// Informational only; not part of the composed base URL.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Verify the server's TLS certificate.
    #[serde(default = "default_verify")]
    pub verify: bool,
}

fn default_scheme() -> Scheme {
    Scheme::Https
}

fn default_basepath() -> String {
    "/api/v4".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_verify() -> bool {
    true
}

impl ConnectionConfig {
    pub fn new(scheme: Scheme, url: &str, basepath: &str, port: u16, verify: bool) -> Self {
        Self {
            scheme,
            url: url.to_string(),
            basepath: basepath.to_string(),
            port,
            verify,
        }
    }

    /// `scheme://url` followed by the base path. Endpoint paths are appended
    /// to this verbatim.
    pub fn base_url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.url, self.basepath)
    }
}
