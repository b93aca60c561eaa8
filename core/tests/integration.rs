//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port so state never
//! leaks between tests, then drives `RequestExecutor` over real HTTP. Most
//! tests use the default reqwest transport; one injects a blocking ureq
//! transport to check that any `Transport` can stand in.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mock_server::{Echo, User};
use request_core::{
    CancellationToken, Fault, HttpRequest, HttpResponse, OperationResult, Payload,
    RequestExecutor, Transport, TransportError, Verb,
};
use serde::Serialize;

#[derive(Serialize)]
struct NewUser<'a> {
    name: &'a str,
}

#[derive(Serialize)]
enum Role {
    Admin,
}

/// Start the mock server on a random port and return its base address.
async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}/")
}

async fn executor() -> RequestExecutor {
    RequestExecutor::initialize(&start_server().await, None).unwrap()
}

#[tokio::test]
async fn get_existing_user() {
    let exec = executor().await;

    let result: OperationResult<User> = exec.get("users/1", &CancellationToken::new()).await;

    assert!(result.is_success());
    let info = result.request_info().as_completed().unwrap();
    assert_eq!(info.response_code, 200);
    assert_eq!(info.response, r#"{"id":1,"name":"Ana"}"#);
    let user = result.into_response().unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "Ana");
}

#[tokio::test]
async fn get_missing_user_is_completed_404() {
    let exec = executor().await;

    let result: OperationResult<User> = exec.get("users/404", &CancellationToken::new()).await;

    assert!(!result.is_success());
    assert!(result.response().is_none());
    let info = result.request_info().as_completed().unwrap();
    assert_eq!(info.response_code, 404);
    assert_eq!(info.response, r#"{"error":"not found"}"#);
}

#[tokio::test]
async fn user_lifecycle() {
    let exec = executor().await;
    let cancel = CancellationToken::new();

    // Create.
    let created: OperationResult<User> = exec
        .post("users", Payload::json(&NewUser { name: "Bo" }), &cancel)
        .await;
    assert!(created.is_success());
    assert_eq!(created.request_info().as_completed().unwrap().response_code, 201);
    let created = created.into_response().unwrap();
    assert_eq!(created.name, "Bo");

    // Rename.
    let path = format!("users/{}", created.id);
    let updated: OperationResult<User> = exec
        .put(&path, Payload::json(&NewUser { name: "Bob" }), &cancel)
        .await;
    assert_eq!(updated.into_response().unwrap().name, "Bob");

    // List.
    let users: OperationResult<Vec<User>> = exec.get("users", &cancel).await;
    assert_eq!(users.into_response().unwrap().len(), 2);

    // Delete; 204 has an empty body.
    let deleted: OperationResult<()> = exec.delete(&path, &cancel).await;
    assert!(deleted.is_success());
    assert_eq!(deleted.request_info().as_completed().unwrap().response_code, 204);

    // Gone.
    let gone: OperationResult<User> = exec.get(&path, &cancel).await;
    assert_eq!(gone.request_info().as_completed().unwrap().response_code, 404);
}

#[tokio::test]
async fn string_payload_arrives_verbatim() {
    let exec = executor().await;

    let result: OperationResult<Echo> = exec
        .post("echo", "{ \"raw\": true }", &CancellationToken::new())
        .await;

    let echo = result.into_response().unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, "{ \"raw\": true }");
    assert_eq!(echo.content_type.as_deref(), Some("application/json; charset=utf-8"));
}

#[tokio::test]
async fn enum_payload_arrives_as_json_string() {
    let exec = executor().await;

    let result: OperationResult<Echo> = exec
        .post("echo", Payload::json(&Role::Admin), &CancellationToken::new())
        .await;

    let echo = result.into_response().unwrap();
    assert_eq!(echo.body, "\"Admin\"");
    assert_eq!(echo.content_type.as_deref(), Some("application/json; charset=utf-8"));
}

#[tokio::test]
async fn absent_payload_arrives_empty() {
    let exec = executor().await;

    let result: OperationResult<Echo> = exec
        .put("echo", Payload::json(&None::<NewUser>), &CancellationToken::new())
        .await;

    let echo = result.into_response().unwrap();
    assert_eq!(echo.method, "PUT");
    assert!(echo.body.is_empty());
    assert!(echo.content_type.is_none());
}

#[tokio::test]
async fn get_and_delete_carry_no_body() {
    let exec = executor().await;
    let cancel = CancellationToken::new();

    let get: OperationResult<Echo> = exec.get("echo", &cancel).await;
    let delete: OperationResult<Echo> = exec.delete("echo", &cancel).await;

    for echo in [get.into_response().unwrap(), delete.into_response().unwrap()] {
        assert!(echo.body.is_empty());
        assert!(echo.content_type.is_none());
    }
}

#[tokio::test]
async fn authorization_is_per_executor() {
    let exec = executor().await;
    let scoped = exec.with_authorization("Bearer token-1").unwrap();
    let cancel = CancellationToken::new();

    let with: OperationResult<Echo> = scoped.get("echo", &cancel).await;
    let without: OperationResult<Echo> = exec.get("echo", &cancel).await;

    assert_eq!(
        with.into_response().unwrap().authorization.as_deref(),
        Some("Bearer token-1")
    );
    assert!(without.into_response().unwrap().authorization.is_none());
}

#[tokio::test]
async fn server_errors_complete_for_every_verb() {
    let exec = executor().await;
    let cancel = CancellationToken::new();

    let results: Vec<OperationResult<serde_json::Value>> = vec![
        exec.get("status/500", &cancel).await,
        exec.post("status/500", "{}", &cancel).await,
        exec.put("status/500", "{}", &cancel).await,
        exec.delete("status/500", &cancel).await,
    ];

    for result in results {
        assert!(!result.is_success());
        assert!(result.response().is_none());
        let info = result.request_info().as_completed().unwrap();
        assert_eq!(info.response_code, 500);
        assert_eq!(info.response, r#"{"status":500}"#);
    }
}

#[tokio::test]
async fn wrong_response_type_keeps_body() {
    let exec = executor().await;

    let result: OperationResult<Vec<u32>> = exec.get("users/1", &CancellationToken::new()).await;

    assert!(!result.is_success());
    match &result.request_info().as_faulted().unwrap().fault {
        Fault::Deserialization { status, body, .. } => {
            assert_eq!(*status, 200);
            assert_eq!(body, r#"{"id":1,"name":"Ana"}"#);
        }
        other => panic!("unexpected fault: {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_interrupts_slow_request() {
    let exec = executor().await;
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result: OperationResult<serde_json::Value> = exec.get("slow/10000", &cancel).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!result.is_success());
    let info = result.request_info().as_faulted().unwrap();
    assert_eq!(info.fault, Fault::Cancelled);
    assert!(info.url.ends_with("/slow/10000"));
}

#[tokio::test]
async fn connection_refused_is_faulted() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let exec = RequestExecutor::initialize(&format!("http://{addr}/"), None).unwrap();

    let result: OperationResult<User> = exec.get("users/1", &CancellationToken::new()).await;

    assert!(!result.is_success());
    let info = result.request_info().as_faulted().unwrap();
    assert!(matches!(info.fault, Fault::Transport(_)));
    assert_eq!(info.verb, Verb::Get);
}

/// Blocking ureq transport run on tokio's blocking pool.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        // 4xx/5xx must come back as data, not errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}

fn execute(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ureq::Error> {
    let mut response = match (req.verb, req.body) {
        (Verb::Get, _) => with_headers(agent.get(&req.url), &req.headers).call(),
        (Verb::Delete, _) => with_headers(agent.delete(&req.url), &req.headers).call(),
        (Verb::Post, Some(body)) => {
            with_headers(agent.post(&req.url), &req.headers).send(body.as_bytes())
        }
        (Verb::Post, None) => with_headers(agent.post(&req.url), &req.headers).send_empty(),
        (Verb::Put, Some(body)) => {
            with_headers(agent.put(&req.url), &req.headers).send(body.as_bytes())
        }
        (Verb::Put, None) => with_headers(agent.put(&req.url), &req.headers).send_empty(),
    }?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string()?;
    Ok(HttpResponse::new(status, body))
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request))
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}

#[tokio::test]
async fn custom_transport_can_be_injected() {
    let base = start_server().await;
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());
    let exec = RequestExecutor::initialize(&base, Some(transport)).unwrap();
    let cancel = CancellationToken::new();

    let found: OperationResult<User> = exec.get("users/1", &cancel).await;
    assert_eq!(found.into_response().unwrap().name, "Ana");

    let missing: OperationResult<User> = exec.get("users/7", &cancel).await;
    assert_eq!(missing.request_info().as_completed().unwrap().response_code, 404);

    let echoed: OperationResult<Echo> = exec
        .post("echo", Payload::json(&NewUser { name: "Cy" }), &cancel)
        .await;
    assert_eq!(echoed.into_response().unwrap().body, r#"{"name":"Cy"}"#);
}
