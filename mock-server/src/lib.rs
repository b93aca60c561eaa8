//! Stub HTTP API for exercising the request executor over real sockets.
//!
//! Routes:
//! - `/users`, `/users/{id}`: in-memory user resource seeded with user 1.
//! - `/echo`: any method; reflects method, content type, authorization and body.
//! - `/status/{code}`: any method; answers with the given status.
//! - `/slow/{ms}`: sleeps before answering, for cancellation tests.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
}

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

pub type Db = Arc<RwLock<BTreeMap<u64, User>>>;

pub fn seed() -> Db {
    let mut users = BTreeMap::new();
    users.insert(
        1,
        User {
            id: 1,
            name: "Ana".to_string(),
        },
    );
    Arc::new(RwLock::new(users))
}

pub fn app() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/slow/{ms}", get(slow))
        .with_state(seed())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let users = db.read().await;
    Json(users.values().cloned().collect())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let mut users = db.write().await;
    let id = users.keys().next_back().copied().unwrap_or(0) + 1;
    let user = User { id, name: input.name };
    users.insert(id, user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let users = db.read().await;
    match users.get(&id) {
        Some(user) => Json(user.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateUser>,
) -> Response {
    let mut users = db.write().await;
    let Some(user) = users.get_mut(&id) else {
        return not_found();
    };
    if let Some(name) = input.name {
        user.name = name;
    }
    Json(user.clone()).into_response()
}

async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut users = db.write().await;
    match users.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let echo = Echo {
        method: method.to_string(),
        content_type: header_text(header::CONTENT_TYPE),
        authorization: header_text(header::AUTHORIZATION),
        body,
    };
    debug!(method = %echo.method, bytes = echo.body.len(), "echo");
    Json(echo)
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, Json(json!({ "status": code }))).into_response(),
        Err(_) => {
            let body = Json(json!({ "error": "invalid status" }));
            (StatusCode::BAD_REQUEST, body).into_response()
        }
    }
}

async fn slow(Path(ms): Path<u64>) -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "slept_ms": ms }))
}
