//! Declarative endpoint table.
//!
//! Each entry names one server operation: its method, a path template with
//! `{placeholder}` segments, and the query parameters it documents.
//! `Transport::call` is the single helper that turns an entry plus arguments
//! into a request; the typed facades below are one-line mappings onto it.

use serde_json::Value;

use crate::backend::HttpBackend;
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestData};
use crate::transport::{decode, Params, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    /// Query parameters the server understands for this endpoint.
    pub params: &'static [&'static str],
}

impl Endpoint {
    /// Substitute `{name}` placeholders from `args`.
    pub fn render(&self, args: Params<'_>) -> Result<String, ApiError> {
        let mut out = String::with_capacity(self.path.len());
        let mut rest = self.path;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find('}')
                .ok_or_else(|| ApiError::MissingPathParameter(after.to_string()))?;
            let name = &after[..end];
            let value = args
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| ApiError::MissingPathParameter(name.to_string()))?;
            out.push_str(value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

pub const GET_LDAP_GROUPS: Endpoint = Endpoint {
    name: "get_ldap_groups",
    method: HttpMethod::Get,
    path: "/ldap/groups",
    params: &["q", "page", "per_page"],
};

pub const LINK_LDAP_GROUP: Endpoint = Endpoint {
    name: "link_ldap_group",
    method: HttpMethod::Post,
    path: "/ldap/groups/{remote_id}/link",
    params: &[],
};

pub const UNLINK_LDAP_GROUP: Endpoint = Endpoint {
    name: "unlink_ldap_group",
    method: HttpMethod::Delete,
    path: "/ldap/groups/{remote_id}/link",
    params: &[],
};

pub const SYNC_LDAP: Endpoint = Endpoint {
    name: "sync_ldap",
    method: HttpMethod::Post,
    path: "/ldap/sync",
    params: &[],
};

pub const TEST_LDAP: Endpoint = Endpoint {
    name: "test_ldap",
    method: HttpMethod::Post,
    path: "/ldap/test",
    params: &[],
};

pub const LOGIN: Endpoint = Endpoint {
    name: "login",
    method: HttpMethod::Post,
    path: "/users/login",
    params: &[],
};

pub const LOGOUT: Endpoint = Endpoint {
    name: "logout",
    method: HttpMethod::Post,
    path: "/users/logout",
    params: &[],
};

pub const GET_USER: Endpoint = Endpoint {
    name: "get_user",
    method: HttpMethod::Get,
    path: "/users/{user_id}",
    params: &[],
};

pub const ENDPOINTS: &[Endpoint] = &[
    GET_LDAP_GROUPS,
    LINK_LDAP_GROUP,
    UNLINK_LDAP_GROUP,
    SYNC_LDAP,
    TEST_LDAP,
    LOGIN,
    LOGOUT,
    GET_USER,
];

pub fn find(name: &str) -> Option<&'static Endpoint> {
    ENDPOINTS.iter().find(|e| e.name == name)
}

/// Caller-supplied parts of an endpoint call, forwarded untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Call<'a> {
    pub options: Option<&'a Value>,
    pub params: Option<Params<'a>>,
    pub data: Option<&'a RequestData>,
}

impl<B: HttpBackend> Transport<B> {
    /// Invoke a table entry and decode the JSON reply.
    pub fn call(&self, endpoint: &Endpoint, args: Params<'_>, call: Call<'_>) -> Result<Value, ApiError> {
        let path = endpoint.render(args)?;
        let response = self.make_request(
            endpoint.method.as_str(),
            &path,
            call.options,
            call.params,
            call.data,
        )?;
        decode(response)
    }

    pub fn ldap(&self) -> Ldap<'_, B> {
        Ldap { transport: self }
    }
}

/// LDAP group administration.
pub struct Ldap<'a, B> {
    transport: &'a Transport<B>,
}

impl<B: HttpBackend> Ldap<'_, B> {
    /// `params`: `q` search term, `page`, `per_page` (max 200).
    pub fn get_ldap_groups(&self, params: Option<Params<'_>>) -> Result<Value, ApiError> {
        self.transport.call(&GET_LDAP_GROUPS, &[], Call { params, ..Call::default() })
    }

    pub fn link_ldap_group(&self, remote_id: &str) -> Result<Value, ApiError> {
        self.transport.call(&LINK_LDAP_GROUP, &[("remote_id", remote_id)], Call::default())
    }

    pub fn unlink_ldap_group(&self, remote_id: &str) -> Result<Value, ApiError> {
        self.transport.call(&UNLINK_LDAP_GROUP, &[("remote_id", remote_id)], Call::default())
    }

    pub fn sync_ldap(&self) -> Result<Value, ApiError> {
        self.transport.call(&SYNC_LDAP, &[], Call::default())
    }

    pub fn test_ldap(&self) -> Result<Value, ApiError> {
        self.transport.call(&TEST_LDAP, &[], Call::default())
    }
}
