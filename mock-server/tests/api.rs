use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, LdapGroup, LdapGroupList, User, PASSWORD, USERNAME, USER_ID};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap()
}

fn login_body() -> String {
    format!(r#"{{"login_id":"{USERNAME}","password":"{PASSWORD}"}}"#)
}

// --- login ---

#[tokio::test]
async fn login_returns_token_and_cookies() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v4/users/login", &login_body()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let token = resp.headers().get("token").unwrap().to_str().unwrap().to_string();
    assert!(!token.is_empty());
    let cookies: Vec<_> = resp
        .headers()
        .get_all(http::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with(&format!("MMAUTHTOKEN={token}")));

    let user: User = body_json(resp).await;
    assert_eq!(user.id, USER_ID);
    assert_eq!(user.username, USERNAME);
}

#[tokio::test]
async fn login_bad_password_returns_envelope() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v4/users/login",
            r#"{"login_id":"alice","password":"nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status_code"], 401);
    assert!(body["message"].as_str().unwrap().contains("password"));
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_401_no_token() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/v4/ldap/groups")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status_code"], 401);
    assert_eq!(body["message"], "no token");
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let resp = app()
        .oneshot(authed("GET", "/api/v4/users/me", "forged"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- diagnostics ---

#[tokio::test]
async fn status_route_emits_envelope() {
    let resp = app()
        .oneshot(Request::builder().uri("/api/v4/status/413").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status_code"], 413);
    assert_eq!(body["message"], "status 413");
}

#[tokio::test]
async fn plain_status_route_has_text_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/v4/status/404/plain")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await, "plain failure 404");
}

#[tokio::test]
async fn echo_reflects_request() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/v4/echo?q=eng&page=2", r#"{"a":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["authorization"], Value::Null);
    assert_eq!(body["content_type"], "application/json");
    assert_eq!(body["query"]["q"], "eng");
    assert_eq!(body["query"]["page"], "2");
    assert_eq!(body["body"]["a"], 1);
}

// --- full LDAP lifecycle ---

#[tokio::test]
async fn ldap_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // login
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/v4/users/login", &login_body()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = resp.headers().get("token").unwrap().to_str().unwrap().to_string();

    // search
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/api/v4/ldap/groups?q=eng", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list: LdapGroupList = body_json(resp).await;
    assert_eq!(list.count, 2);
    assert_eq!(list.groups[0].name, "eng-oncall");
    assert_eq!(list.groups[1].name, "engineering");

    // paging
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/api/v4/ldap/groups?page=1&per_page=2", &token))
        .await
        .unwrap();
    let list: LdapGroupList = body_json(resp).await;
    assert_eq!(list.count, 3);
    assert_eq!(list.groups.len(), 1);

    // link
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("POST", "/api/v4/ldap/groups/cn=marketing/link", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let linked: LdapGroup = body_json(resp).await;
    assert!(linked.mattermost_group_id.is_some());

    // unlink
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("DELETE", "/api/v4/ldap/groups/cn=marketing/link", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // unlink again: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("DELETE", "/api/v4/ldap/groups/cn=marketing/link", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // feature disabled
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("POST", "/api/v4/ldap/test", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);

    // logout
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("POST", "/api/v4/users/logout", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // token no longer valid
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/api/v4/users/me", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn huge_page_number_returns_empty_page() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/v4/users/login", &login_body()))
        .await
        .unwrap();
    let token = resp.headers().get("token").unwrap().to_str().unwrap().to_string();

    let uri = format!("/api/v4/ldap/groups?page={}&per_page=200", usize::MAX);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", &uri, &token))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let list: LdapGroupList = body_json(resp).await;
    assert_eq!(list.count, 3);
    assert!(list.groups.is_empty());
}
