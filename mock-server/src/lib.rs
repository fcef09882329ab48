use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const USER_ID: &str = "7xk9p3m1qbf8tj4n6r2wy5zc0a";
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "hunter2";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LdapGroup {
    pub primary_key: String,
    pub name: String,
    pub mattermost_group_id: Option<String>,
    pub has_syncables: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LdapGroupList {
    pub count: usize,
    pub groups: Vec<LdapGroup>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct GroupQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_per_page() -> usize {
    60
}

pub struct Server {
    sessions: RwLock<HashSet<String>>,
    groups: RwLock<HashMap<String, LdapGroup>>,
}

pub type Db = Arc<Server>;

/// Failure rendered in the server's error envelope.
pub struct ApiFailure {
    status: StatusCode,
    id: &'static str,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, id: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            id,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = json!({
            "id": self.id,
            "message": self.message,
            "detailed_error": "",
            "request_id": Uuid::new_v4().simple().to_string(),
            "status_code": self.status.as_u16(),
        });
        (self.status, Json(body)).into_response()
    }
}

fn seed_groups() -> HashMap<String, LdapGroup> {
    [
        ("cn=engineering", "engineering"),
        ("cn=eng-oncall", "eng-oncall"),
        ("cn=marketing", "marketing"),
    ]
    .into_iter()
    .map(|(key, name)| {
        let group = LdapGroup {
            primary_key: key.to_string(),
            name: name.to_string(),
            mattermost_group_id: None,
            has_syncables: false,
        };
        (key.to_string(), group)
    })
    .collect()
}

fn user() -> User {
    User {
        id: USER_ID.to_string(),
        username: USERNAME.to_string(),
        email: format!("{USERNAME}@example.com"),
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(Server {
        sessions: RwLock::new(HashSet::new()),
        groups: RwLock::new(seed_groups()),
    });
    let api = Router::new()
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/{user_id}", get(get_user))
        .route("/ldap/groups", get(list_groups))
        .route("/ldap/groups/{remote_id}/link", post(link_group).delete(unlink_group))
        .route("/ldap/sync", post(sync_ldap))
        .route("/ldap/test", post(test_ldap))
        .route("/echo", any(echo))
        .route("/echo/body", any(echo_body))
        .route("/status/{code}", any(status_envelope))
        .route("/status/{code}/plain", any(status_plain))
        .route("/malformed", get(malformed));
    Router::new().nest("/api/v4", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve the bearer token to a live session.
async fn authenticate(db: &Db, headers: &HeaderMap) -> Result<String, ApiFailure> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "api.context.session_expired.app_error",
            "no token",
        ));
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    if db.sessions.read().await.contains(token) {
        Ok(token.to_string())
    } else {
        Err(ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "api.context.session_expired.app_error",
            "invalid or expired session",
        ))
    }
}

async fn login(State(db): State<Db>, Json(input): Json<LoginRequest>) -> Result<Response, ApiFailure> {
    if input.login_id != USERNAME || input.password != PASSWORD {
        return Err(ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "api.user.login.invalid_credentials_email_username",
            "Enter a valid email or username and/or password.",
        ));
    }
    if input.token.as_deref().is_some_and(|t| t.is_empty()) {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "api.user.check_user_mfa.bad_code.app_error",
            "Invalid MFA token.",
        ));
    }

    let token = Uuid::new_v4().simple().to_string();
    db.sessions.write().await.insert(token.clone());
    tracing::debug!(user = USERNAME, "session created");

    let headers = AppendHeaders([
        (HeaderName::from_static("token"), token.clone()),
        (header::SET_COOKIE, format!("MMAUTHTOKEN={token}; Path=/; HttpOnly")),
        (header::SET_COOKIE, format!("MMUSERID={USER_ID}; Path=/")),
    ]);
    Ok((headers, Json(user())).into_response())
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiFailure> {
    let token = authenticate(&db, &headers).await?;
    db.sessions.write().await.remove(&token);
    Ok(Json(json!({ "status": "OK" })))
}

async fn get_user(
    State(db): State<Db>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiFailure> {
    authenticate(&db, &headers).await?;
    if user_id == "me" || user_id == USER_ID {
        Ok(Json(user()))
    } else {
        Err(ApiFailure::new(
            StatusCode::NOT_FOUND,
            "app.user.missing_account.const",
            "Unable to find the user.",
        ))
    }
}

async fn list_groups(
    State(db): State<Db>,
    Query(query): Query<GroupQuery>,
    headers: HeaderMap,
) -> Result<Json<LdapGroupList>, ApiFailure> {
    authenticate(&db, &headers).await?;
    if query.per_page > 200 {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "api.context.invalid_url_param.app_error",
            "Invalid per_page parameter.",
        ));
    }

    let groups = db.groups.read().await;
    let mut matching: Vec<LdapGroup> = groups
        .values()
        .filter(|g| query.q.as_deref().is_none_or(|q| g.name.contains(q)))
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.name.cmp(&b.name));
    let count = matching.len();
    let page = matching
        .into_iter()
        .skip(query.page.saturating_mul(query.per_page))
        .take(query.per_page)
        .collect();
    Ok(Json(LdapGroupList { count, groups: page }))
}

async fn link_group(
    State(db): State<Db>,
    Path(remote_id): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<LdapGroup>), ApiFailure> {
    authenticate(&db, &headers).await?;
    let mut groups = db.groups.write().await;
    let group = groups.get_mut(&remote_id).ok_or_else(|| group_not_found(&remote_id))?;
    if group.mattermost_group_id.is_none() {
        group.mattermost_group_id = Some(Uuid::new_v4().simple().to_string());
    }
    Ok((StatusCode::CREATED, Json(group.clone())))
}

async fn unlink_group(
    State(db): State<Db>,
    Path(remote_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiFailure> {
    authenticate(&db, &headers).await?;
    let mut groups = db.groups.write().await;
    let group = groups.get_mut(&remote_id).ok_or_else(|| group_not_found(&remote_id))?;
    if group.mattermost_group_id.take().is_none() {
        return Err(group_not_found(&remote_id));
    }
    Ok(Json(json!({ "status": "OK" })))
}

fn group_not_found(remote_id: &str) -> ApiFailure {
    ApiFailure::new(
        StatusCode::NOT_FOUND,
        "api.ldap_group.not_found",
        format!("LDAP group {remote_id} not found"),
    )
}

async fn sync_ldap(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiFailure> {
    authenticate(&db, &headers).await?;
    Ok(Json(json!({ "status": "OK" })))
}

async fn test_ldap(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiFailure> {
    authenticate(&db, &headers).await?;
    Err(ApiFailure::new(
        StatusCode::NOT_IMPLEMENTED,
        "ent.ldap.disabled.app_error",
        "LDAP is not enabled on this server",
    ))
}

/// Reflect what the server received.
async fn echo(
    method: Method,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<Value> {
    let header_str = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let text = String::from_utf8_lossy(&body).into_owned();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Json(json!({
        "method": method.as_str(),
        "authorization": header_str(header::AUTHORIZATION),
        "content_type": header_str(header::CONTENT_TYPE),
        "query": query,
        "body": body,
    }))
}

async fn echo_body(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn status_envelope(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let body = json!({
        "id": "mock.status",
        "message": format!("status {code}"),
        "status_code": code,
    });
    (status, Json(body)).into_response()
}

async fn status_plain(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    (status, format!("plain failure {code}")).into_response()
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "not json")
}
