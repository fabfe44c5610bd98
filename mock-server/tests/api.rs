use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, IndexProvider, IndexSummary, LoginResponse, User};
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

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- index providers ---

#[tokio::test]
async fn index_providers_lists_cs_and_cni() {
    let resp = app().oneshot(get("/api/index_providers")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let providers: Vec<IndexProvider> = body_json(resp).await;
    let ids: Vec<&str> = providers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["cs", "cni"]);
}

#[tokio::test]
async fn indices_for_known_provider() {
    let resp = app().oneshot(get("/api/indices/cs")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let indices: Vec<IndexSummary> = body_json(resp).await;
    assert!(indices.iter().any(|i| i.code == "000300"));
}

#[tokio::test]
async fn indices_for_unknown_provider_returns_400() {
    let resp = app().oneshot(get("/api/indices/nasdaq")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "unsupported index provider");
}

// --- users ---

#[tokio::test]
async fn users_returns_list() {
    let resp = app().oneshot(get("/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(resp).await;
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].username, "admin");
}

// --- login ---

#[tokio::test]
async fn login_accepts_valid_credentials() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"username":"admin","password":"secret"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let login: LoginResponse = body_json(resp).await;
    assert!(!login.token.is_nil());
}

#[tokio::test]
async fn login_rejects_bad_password_with_401() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"username":"admin","password":"wrong"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "invalid credentials");
}

#[tokio::test]
async fn login_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/login", r#"{"user":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_without_content_type_returns_415() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .body(r#"{"username":"admin","password":"secret"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

// --- slow ---

#[tokio::test]
async fn slow_without_delay_answers_immediately() {
    let resp = app().oneshot(get("/slow")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["slept_ms"], 0);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_method_headers_and_body() {
    let resp = app()
        .oneshot(json_request("PUT", "/echo", r#"{"a":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.body, r#"{"a":1}"#);
    assert!(echo
        .headers
        .iter()
        .any(|(k, v)| k == "content-type" && v == "application/json"));
}

// --- routing ---

#[tokio::test]
async fn unknown_path_returns_404() {
    let resp = app().oneshot(get("/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn wrong_method_returns_405() {
    let resp = app()
        .oneshot(Request::builder().method("DELETE").uri("/users").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
