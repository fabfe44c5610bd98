use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexProvider {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexSummary {
    pub code: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub username: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: Uuid,
}

#[derive(Deserialize)]
pub struct SlowParams {
    #[serde(default)]
    pub ms: u64,
}

/// What `/echo` saw: method, headers (lowercased names) and raw body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/api/index_providers", get(index_providers))
        .route("/api/indices/{provider}", get(indices))
        .route("/users", get(list_users))
        .route("/login", post(login))
        .route("/slow", get(slow))
        .route("/echo", any(echo))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn index_providers() -> Json<Vec<IndexProvider>> {
    Json(vec![
        IndexProvider {
            id: "cs".to_string(),
            name: "中证指数".to_string(),
        },
        IndexProvider {
            id: "cni".to_string(),
            name: "国证指数".to_string(),
        },
    ])
}

async fn indices(Path(provider): Path<String>) -> Result<Json<Vec<IndexSummary>>, (StatusCode, Json<Value>)> {
    let listed: &[(&str, &str)] = match provider.as_str() {
        "cs" => &[("000300", "沪深300"), ("000905", "中证500")],
        "cni" => &[("399001", "深证成指"), ("399006", "创业板指")],
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "unsupported index provider" })),
            ))
        }
    };
    Ok(Json(
        listed
            .iter()
            .map(|(code, name)| IndexSummary {
                code: code.to_string(),
                name: name.to_string(),
            })
            .collect(),
    ))
}

async fn list_users() -> Json<Vec<User>> {
    Json(vec![
        User {
            id: 1,
            username: "admin".to_string(),
        },
        User {
            id: 2,
            username: "analyst".to_string(),
        },
    ])
}

async fn login(Json(input): Json<Credentials>) -> Result<Json<LoginResponse>, (StatusCode, Json<Value>)> {
    if input.username == "admin" && input.password == "secret" {
        Ok(Json(LoginResponse {
            token: Uuid::new_v4(),
        }))
    } else {
        tracing::warn!(username = %input.username, "rejected login");
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid credentials" })),
        ))
    }
}

async fn slow(Query(params): Query<SlowParams>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    Json(json!({ "slept_ms": params.ms }))
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        body,
    })
}
