use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use garza_orchestrator::api;
use garza_orchestrator::config::EnvConfig;
use garza_orchestrator::domain::ExecOutput;
use garza_orchestrator::infra::{ExecError, RemoteExecutor};
use garza_orchestrator::state::AppState;

/// What the fake executor answers with
#[derive(Clone)]
enum Reply {
    Output(ExecOutput),
    Timeout,
    Launch(&'static str),
}

/// In-memory executor that records every command it is asked to run
struct RecordingExecutor {
    reply: Reply,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl RecordingExecutor {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn ok(returncode: i32, stdout: &str, stderr: &str) -> Arc<Self> {
        Self::new(Reply::Output(ExecOutput {
            returncode,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }))
    }

    fn calls(&self) -> Vec<(String, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteExecutor for RecordingExecutor {
    async fn run(&self, command: &str, timeout: Duration) -> Result<ExecOutput, ExecError> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), timeout));

        match &self.reply {
            Reply::Output(output) => Ok(output.clone()),
            Reply::Timeout => Err(ExecError::Timeout(timeout)),
            Reply::Launch(msg) => Err(ExecError::Launch(msg.to_string())),
        }
    }
}

fn create_test_app(executor: Arc<RecordingExecutor>) -> Router {
    let state = AppState::with_executor(EnvConfig::default(), executor);
    api::router(Arc::new(state))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

// ========== /health ==========

#[tokio::test]
async fn test_health_endpoint() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let (status, json) = send(
        app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "garza-orchestrator");
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(executor.calls().is_empty());

    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["service", "status", "timestamp", "version"]);
}

#[tokio::test]
async fn test_status_alias() {
    let app = create_test_app(RecordingExecutor::ok(0, "", ""));

    let (status, json) = send(
        app,
        Request::builder()
            .uri("/status")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

// ========== /execute ==========

#[tokio::test]
async fn test_execute_missing_command() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let (status, json) = send(app, post_json("/execute", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "command required");
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_execute_empty_command() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let (status, json) = send(app, post_json("/execute", json!({ "command": "" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_execute_malformed_body() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/execute")
        .header("content-type", "application/json")
        .body(Body::from("{\"command\": "))
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_execute_success_passes_command_verbatim() {
    let executor = RecordingExecutor::ok(0, "total 0\ndrwx  .\n", "");
    let app = create_test_app(executor.clone());

    let (status, json) = send(
        app,
        post_json("/execute", json!({ "command": "ls -la /tmp | head -n 2" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["returncode"], 0);
    assert_eq!(json["stdout"], "total 0\ndrwx  .\n");
    assert_eq!(json["stderr"], "");
    assert!(json["timestamp"].is_string());

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "ls -la /tmp | head -n 2");
    assert_eq!(calls[0].1, Duration::from_secs(300));
}

#[tokio::test]
async fn test_execute_remote_failure_is_ok_status() {
    let app = create_test_app(RecordingExecutor::ok(2, "", "No such file or directory\n"));

    let (status, json) = send(app, post_json("/execute", json!({ "command": "ls /nope" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["returncode"], 2);
    assert_eq!(json["stderr"], "No such file or directory\n");
}

#[tokio::test]
async fn test_execute_timeout() {
    let app = create_test_app(RecordingExecutor::new(Reply::Timeout));

    let (status, json) = send(app, post_json("/execute", json!({ "command": "sleep 999" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_execute_launch_failure() {
    let app = create_test_app(RecordingExecutor::new(Reply::Launch(
        "Failed to spawn command: No such file or directory (os error 2)",
    )));

    let (status, json) = send(app, post_json("/execute", json!({ "command": "uptime" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json["error"],
        "Failed to spawn command: No such file or directory (os error 2)"
    );
}

// ========== /deploy/mcp ==========

#[tokio::test]
async fn test_deploy_missing_app_name() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let (status, json) = send(
        app,
        post_json("/deploy/mcp", json!({ "repo": "https://example.com/r.git" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "app_name and repo required");
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_deploy_missing_repo() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let (status, _) = send(app, post_json("/deploy/mcp", json!({ "app_name": "demo" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_deploy_rejects_path_app_name() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let (status, _) = send(
        app,
        post_json("/deploy/mcp", json!({ "app_name": "../etc", "repo": "r" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_deploy_rejects_option_like_fields() {
    let executor = RecordingExecutor::ok(0, "", "");

    for body in [
        json!({ "app_name": "-rf", "repo": "r" }),
        json!({ "app_name": "demo", "repo": "r", "region": "--access-token=x" }),
    ] {
        let (status, json) = send(create_test_app(executor.clone()), post_json("/deploy/mcp", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_deploy_option_like_repo_follows_double_dash() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let (status, _) = send(
        app,
        post_json(
            "/deploy/mcp",
            json!({ "app_name": "h:r", "repo": "--config=core.sshCommand=touch /tmp/x" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(executor.calls()[0]
        .0
        .contains("git clone -- '--config=core.sshCommand=touch /tmp/x' 'h:r'"));
}

#[tokio::test]
async fn test_deploy_uses_default_region() {
    let executor = RecordingExecutor::ok(0, "deployed\n", "");
    let app = create_test_app(executor.clone());

    let (status, json) = send(
        app,
        post_json(
            "/deploy/mcp",
            json!({
                "app_name": "lastrock-mcp",
                "repo": "https://github.com/itsablabla/lastrock-mcp.git"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["app_name"], "lastrock-mcp");
    assert_eq!(json["region"], "dfw");
    assert_eq!(json["returncode"], 0);
    assert_eq!(json["stdout"], "deployed\n");

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let (command, timeout) = &calls[0];
    assert!(command.starts_with("cd /tmp && rm -rf lastrock-mcp && git clone -- "));
    assert!(command.ends_with("deploy --ha=false --region dfw"));
    assert_eq!(*timeout, Duration::from_secs(600));
}

#[tokio::test]
async fn test_deploy_explicit_region() {
    let executor = RecordingExecutor::ok(0, "", "");
    let app = create_test_app(executor.clone());

    let (status, json) = send(
        app,
        post_json(
            "/deploy/mcp",
            json!({ "app_name": "demo", "repo": "r", "region": "ord" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["region"], "ord");
    assert!(executor.calls()[0].0.ends_with("--region ord"));
}

#[tokio::test]
async fn test_deploy_remote_failure_reports_failed() {
    let app = create_test_app(RecordingExecutor::ok(1, "", "fatal: repository not found\n"));

    let (status, json) = send(
        app,
        post_json("/deploy/mcp", json!({ "app_name": "demo", "repo": "r" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "failed");
    assert_eq!(json["returncode"], 1);
    assert_eq!(json["stderr"], "fatal: repository not found\n");
}

#[tokio::test]
async fn test_deploy_timeout() {
    let app = create_test_app(RecordingExecutor::new(Reply::Timeout));

    let (status, json) = send(
        app,
        post_json("/deploy/mcp", json!({ "app_name": "demo", "repo": "r" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Deployment timed out after 10 minutes");
}
