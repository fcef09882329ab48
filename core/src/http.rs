//! HTTP request and response types described as plain data.
//!
//! # Design
//! `Transport` composes an `HttpRequest` without touching the network and
//! hands it to an `HttpBackend` for execution; the backend returns an
//! `HttpResponse`. Keeping both sides as owned data makes the request
//! pipeline testable without a server.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Case-insensitive lookup. Anything unrecognized is treated as `Get`;
    /// existing callers rely on this.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("post") {
            HttpMethod::Post
        } else if name.eq_ignore_ascii_case("put") {
            HttpMethod::Put
        } else if name.eq_ignore_ascii_case("delete") {
            HttpMethod::Delete
        } else {
            HttpMethod::Get
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Raw `data` payload supplied by a caller alongside (or instead of) a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestData {
    /// Key/value pairs sent url-encoded.
    Form(Vec<(String, String)>),
    /// Bytes sent as-is.
    Raw(Vec<u8>),
}

impl RequestData {
    pub fn is_empty(&self) -> bool {
        match self {
            RequestData::Form(pairs) => pairs.is_empty(),
            RequestData::Raw(bytes) => bytes.is_empty(),
        }
    }
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    Json(String),
    Form(String),
    Raw(Vec<u8>),
}

impl HttpBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            HttpBody::Json(_) => "application/json",
            HttpBody::Form(_) => "application/x-www-form-urlencoded",
            HttpBody::Raw(_) => "application/octet-stream",
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HttpBody::Json(s) | HttpBody::Form(s) => s.as_bytes(),
            HttpBody::Raw(bytes) => bytes,
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Query parameters, not yet percent-encoded.
    pub query: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    /// First header with this name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with this name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Every value of a repeatable header such as `Set-Cookie`.
    pub fn headers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
