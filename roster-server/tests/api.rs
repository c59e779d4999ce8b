use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use roster_core::{Directory, InMemoryStore, ReviewerPicker, Services, User};
use roster_server::{router, AppState};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn app_with(store: Arc<InMemoryStore>, shutdown: CancellationToken) -> Router {
    let services = Services::new(store.clone(), store, ReviewerPicker::seeded(11));
    router(AppState::new(services, shutdown, Duration::from_secs(5)))
}

fn app() -> Router {
    app_with(Arc::new(InMemoryStore::new()), CancellationToken::new())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_backend(app: &Router) {
    let (status, _) = send(
        app,
        "POST",
        "/team/add",
        Some(json!({
            "team_name": "backend",
            "members": [
                {"user_id": "a1", "username": "Author", "is_active": true},
                {"user_id": "r1", "username": "Rev One", "is_active": true},
                {"user_id": "r2", "username": "Rev Two", "is_active": true},
                {"user_id": "r3", "username": "Rev Three", "is_active": true}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn team_add_then_get() {
    let app = app();
    seed_backend(&app).await;

    let (status, body) = send(&app, "GET", "/team/get?team_name=backend", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "backend");
    assert_eq!(body["members"].as_array().unwrap().len(), 4);
    assert_eq!(body["members"][0]["user_id"], "a1");
}

#[tokio::test]
async fn duplicate_team_is_bad_request() {
    let app = app();
    seed_backend(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/team/add",
        Some(json!({"team_name": "backend", "members": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TEAM_EXISTS");
}

#[tokio::test]
async fn missing_team_is_not_found() {
    let (status, body) = send(&app(), "GET", "/team/get?team_name=ghosts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn pull_request_lifecycle() {
    let app = app();
    seed_backend(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr-1", "pull_request_name": "Add X", "author_id": "a1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let pr = &body["pr"];
    assert_eq!(pr["status"], "OPEN");
    assert!(pr.get("mergedAt").is_none());
    let reviewers: Vec<String> = serde_json::from_value(pr["assigned_reviewers"].clone()).unwrap();
    assert_eq!(reviewers.len(), 2);
    assert!(!reviewers.contains(&"a1".to_string()));

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr-1", "old_user_id": reviewers[0]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let replaced_by = body["replaced_by"].as_str().unwrap().to_string();
    assert_eq!(body["pr"]["assigned_reviewers"][0], replaced_by.as_str());
    assert_eq!(body["pr"]["assigned_reviewers"][1], reviewers[1].as_str());

    let (status, body) = send(
        &app,
        "GET",
        &format!("/users/getReview?user_id={replaced_by}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pull_requests"][0]["pull_request_id"], "pr-1");

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/merge",
        Some(json!({"pull_request_id": "pr-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["status"], "MERGED");
    let merged_at = body["pr"]["mergedAt"].clone();
    assert!(merged_at.is_string());

    // Merging again is a no-op
    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/merge",
        Some(json!({"pull_request_id": "pr-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["mergedAt"], merged_at);

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr-1", "old_reviewer_id": replaced_by})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PR_MERGED");
}

#[tokio::test]
async fn duplicate_pull_request_conflicts() {
    let app = app();
    seed_backend(&app).await;
    let req = json!({"pull_request_id": "pr-1", "pull_request_name": "Add X", "author_id": "a1"});

    let (status, _) = send(&app, "POST", "/pullRequest/create", Some(req.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/pullRequest/create", Some(req)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PR_EXISTS");
}

#[tokio::test]
async fn unknown_author_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr-1", "pull_request_name": "Add X", "author_id": "nobody"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_requests_are_bad_request() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/merge",
        Some(json!({"wrong_field": "pr-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "", "pull_request_name": "X", "author_id": "a1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = send(&app, "GET", "/users/getReview", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deactivated_user_is_skipped() {
    let app = app();
    seed_backend(&app).await;

    for user in ["r1", "r2"] {
        let (status, body) = send(
            &app,
            "POST",
            "/users/setIsActive",
            Some(json!({"user_id": user, "is_active": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["is_active"], false);
    }

    let (_, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr-1", "pull_request_name": "Add X", "author_id": "a1"})),
    )
    .await;
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["r3"]));

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr-1", "old_reviewer_id": "r3"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NO_CANDIDATE");
}

#[tokio::test]
async fn storage_failure_is_internal() {
    let store = Arc::new(InMemoryStore::new());
    let app = app_with(store.clone(), CancellationToken::new());
    seed_backend(&app).await;
    store.set_fail_writes(true);

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr-1", "pull_request_name": "Add X", "author_id": "a1"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL");
}

#[tokio::test]
async fn shutdown_cancels_requests() {
    let shutdown = CancellationToken::new();
    let app = app_with(Arc::new(InMemoryStore::new()), shutdown.clone());
    shutdown.cancel();

    let (status, body) = send(&app, "GET", "/team/get?team_name=backend", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "CANCELLED");
}

/// Directory whose team lookups stall well past the request deadline
struct SlowDirectory {
    inner: Arc<InMemoryStore>,
    delay: Duration,
}

#[async_trait]
impl Directory for SlowDirectory {
    async fn user_by_id(&self, id: &str) -> roster_core::Result<Option<User>> {
        self.inner.user_by_id(id).await
    }

    async fn users_by_team(&self, team_name: &str) -> roster_core::Result<Vec<User>> {
        self.inner.users_by_team(team_name).await
    }

    async fn team_exists(&self, team_name: &str) -> roster_core::Result<bool> {
        tokio::time::sleep(self.delay).await;
        self.inner.team_exists(team_name).await
    }

    async fn create_team(&self, team_name: &str, members: &[User]) -> roster_core::Result<()> {
        self.inner.create_team(team_name, members).await
    }

    async fn set_is_active(&self, id: &str, is_active: bool) -> roster_core::Result<Option<User>> {
        self.inner.set_is_active(id, is_active).await
    }
}

#[tokio::test]
async fn slow_request_times_out_with_error_body() {
    let store = Arc::new(InMemoryStore::new());
    let directory = Arc::new(SlowDirectory {
        inner: store.clone(),
        delay: Duration::from_millis(500),
    });
    let services = Services::new(directory, store, ReviewerPicker::seeded(11));
    let app = router(AppState::new(
        services,
        CancellationToken::new(),
        Duration::from_millis(50),
    ));

    let started = std::time::Instant::now();
    let (status, body) = send(&app, "GET", "/team/get?team_name=x", None).await;

    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "TIMEOUT");
    assert!(body["error"]["message"].as_str().unwrap().contains("50ms"));
}
