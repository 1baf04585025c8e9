use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tally_github_issues::TallyConfig;
use tally_github_issues_runtime::{
    build_tally_webhook_router, GithubApiClient, GithubApiClientConfig, TallyServerState,
};
use tokio::net::TcpListener;

#[derive(Default)]
struct FakeGithub {
    comments: Mutex<Vec<Value>>,
    next_id: Mutex<u64>,
}

impl FakeGithub {
    fn push_comment(&self, login: &str, body: &str) -> u64 {
        let mut next_id = self.next_id.lock().expect("id lock");
        *next_id += 1;
        let id = *next_id;
        self.comments.lock().expect("comments lock").push(json!({
            "id": id,
            "body": body,
            "created_at": format!("2026-01-01T00:00:{id:02}Z"),
            "user": {"login": login}
        }));
        id
    }

    fn bot_comments(&self, bot_login: &str) -> Vec<Value> {
        self.comments
            .lock()
            .expect("comments lock")
            .iter()
            .filter(|comment| comment["user"]["login"] == bot_login)
            .cloned()
            .collect()
    }
}

async fn list_comments(
    State(github): State<Arc<FakeGithub>>,
    Path((_owner, _repo, _number)): Path<(String, String, u64)>,
) -> Json<Value> {
    Json(Value::Array(
        github.comments.lock().expect("comments lock").clone(),
    ))
}

async fn create_comment(
    State(github): State<Arc<FakeGithub>>,
    Path((_owner, _repo, _number)): Path<(String, String, u64)>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let body = payload["body"].as_str().unwrap_or_default().to_string();
    let id = github.push_comment("robotally", &body);
    let created = github
        .comments
        .lock()
        .expect("comments lock")
        .iter()
        .find(|comment| comment["id"] == id)
        .cloned()
        .unwrap_or(Value::Null);
    (StatusCode::CREATED, Json(created))
}

async fn edit_comment(
    State(github): State<Arc<FakeGithub>>,
    Path((_owner, _repo, comment_id)): Path<(String, String, u64)>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut comments = github.comments.lock().expect("comments lock");
    match comments
        .iter_mut()
        .find(|comment| comment["id"] == comment_id)
    {
        Some(comment) => {
            comment["body"] = payload["body"].clone();
            (StatusCode::OK, Json(comment.clone()))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))),
    }
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    tokio::time::sleep(Duration::from_millis(25)).await;
    addr
}

async fn spawn_fake_github(github: Arc<FakeGithub>) -> SocketAddr {
    let router = Router::new()
        .route(
            "/repos/{owner}/{repo}/issues/{number}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/repos/{owner}/{repo}/issues/comments/{comment_id}",
            patch(edit_comment),
        )
        .with_state(github);
    spawn(router).await
}

async fn spawn_robotally(github_addr: SocketAddr) -> SocketAddr {
    let client = GithubApiClient::new(GithubApiClientConfig {
        api_base: format!("http://{github_addr}"),
        token: "integration-token".to_string(),
        request_timeout_ms: 2_000,
        retry_max_attempts: 1,
        retry_base_delay_ms: 1,
    })
    .expect("github client");
    let state = TallyServerState::new(TallyConfig::default(), Arc::new(client));
    spawn(build_tally_webhook_router(Arc::new(state))).await
}

async fn deliver(addr: SocketAddr, payload: Value) -> Value {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/"))
        .body(payload.to_string())
        .send()
        .await
        .expect("deliver webhook");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json().await.expect("webhook response json")
}

fn repository() -> Value {
    json!({"name": "repo", "owner": {"login": "owner"}})
}

fn comment_created(sender: &str) -> Value {
    json!({
        "action": "created",
        "issue": {"number": 5},
        "repository": repository(),
        "sender": {"login": sender}
    })
}

#[tokio::test]
async fn integration_pull_request_report_tracks_votes_and_keeps_warning() {
    let github = Arc::new(FakeGithub::default());
    let github_addr = spawn_fake_github(github.clone()).await;
    let robotally = spawn_robotally(github_addr).await;

    let opened = deliver(
        robotally,
        json!({
            "action": "opened",
            "pull_request": {"number": 5, "base": {"ref": "master"}},
            "repository": repository(),
            "sender": {"login": "alice"}
        }),
    )
    .await;
    assert_eq!(opened["outcome"], "created");
    let reports = github.bot_comments("robotally");
    assert_eq!(reports.len(), 1);
    assert!(reports[0]["body"]
        .as_str()
        .unwrap_or_default()
        .starts_with(":exclamation: Pull request against `master` :exclamation:"));

    github.push_comment("alice", "Looks good :+1:");
    assert_eq!(deliver(robotally, comment_created("alice")).await["outcome"], "edited");

    github.push_comment("bob", ":-1: please rebase :tada:");
    github.push_comment("carol", ":tada: :tada: :+1: :-1:");
    assert_eq!(deliver(robotally, comment_created("carol")).await["outcome"], "edited");

    let reports = github.bot_comments("robotally");
    assert_eq!(reports.len(), 1);
    let report = reports[0]["body"].as_str().unwrap_or_default();
    assert!(report.starts_with(":exclamation: Pull request against `master` :exclamation:\n\n"));
    assert!(report.contains("| :+1: | 2 | @alice @carol |"));
    assert!(report.contains("| :-1: | 1 | @bob |"));
    assert!(report.contains("| :tada: | @bob @carol |"));
    assert!(report.contains("_Updated: "));

    let ignored = deliver(robotally, comment_created("robotally")).await;
    assert_eq!(ignored["outcome"], "ignored");
}

#[tokio::test]
async fn integration_refresh_without_report_leaves_issue_untouched() {
    let github = Arc::new(FakeGithub::default());
    let github_addr = spawn_fake_github(github.clone()).await;
    let robotally = spawn_robotally(github_addr).await;

    github.push_comment("alice", ":+1:");
    let response = deliver(robotally, comment_created("alice")).await;
    assert_eq!(response["outcome"], "skipped");
    assert!(github.bot_comments("robotally").is_empty());
    assert_eq!(github.comments.lock().expect("comments lock").len(), 1);
}
