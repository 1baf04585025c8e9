use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tally_github_issues::{CommentStore, GithubIssueComment, ThreadRef};
use tracing::{debug, warn};

use super::github_retry::{
    error_excerpt, is_transient_response, is_transient_transport, retry_after_hint, RetryPolicy,
};

const COMMENTS_PAGE_SIZE: usize = 100;
const RETRY_ATTEMPT_HEADER: &str = "x-robotally-retry-attempt";
const ERROR_EXCERPT_CHARS: usize = 800;

#[derive(Debug, Clone)]
/// Connection settings for the GitHub REST API.
pub struct GithubApiClientConfig {
    pub api_base: String,
    pub token: String,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
}

#[derive(Clone)]
/// GitHub issue-comments client backing the report reconciler.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    retry: RetryPolicy,
}

impl GithubApiClient {
    pub fn new(config: GithubApiClientConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("robotally"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let token = config.token.trim();
        if !token.is_empty() {
            let auth_header = format!("Bearer {token}");
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(&auth_header)
                    .context("invalid github authorization header")?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http: client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(config.retry_max_attempts, config.retry_base_delay_ms),
        })
    }

    pub async fn list_issue_comments(&self, thread: &ThreadRef) -> Result<Vec<GithubIssueComment>> {
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let per_page = COMMENTS_PAGE_SIZE.to_string();
            let chunk: Vec<GithubIssueComment> = self
                .request_json("list issue comments", || {
                    self.http
                        .get(format!(
                            "{}/repos/{}/{}/issues/{}/comments",
                            self.api_base, thread.owner, thread.repo, thread.number
                        ))
                        .query(&[
                            ("sort", "created"),
                            ("direction", "asc"),
                            ("per_page", per_page.as_str()),
                            ("page", page_value.as_str()),
                        ])
                })
                .await?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            if chunk_len < COMMENTS_PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        debug!(thread = %thread.slug(), comments = rows.len(), "listed issue comments");
        Ok(rows)
    }

    pub async fn create_issue_comment(
        &self,
        thread: &ThreadRef,
        body: &str,
    ) -> Result<GithubIssueComment> {
        let payload = json!({ "body": body });
        self.request_json("create issue comment", || {
            self.http
                .post(format!(
                    "{}/repos/{}/{}/issues/{}/comments",
                    self.api_base, thread.owner, thread.repo, thread.number
                ))
                .json(&payload)
        })
        .await
    }

    pub async fn update_issue_comment(
        &self,
        thread: &ThreadRef,
        comment_id: u64,
        body: &str,
    ) -> Result<GithubIssueComment> {
        let payload = json!({ "body": body });
        self.request_json("update issue comment", || {
            self.http
                .patch(format!(
                    "{}/repos/{}/{}/issues/comments/{}",
                    self.api_base, thread.owner, thread.repo, comment_id
                ))
                .json(&payload)
        })
        .await
    }

    async fn request_json<T, F>(&self, operation: &str, mut build_request: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 1_usize;
        loop {
            let sent = build_request()
                .header(RETRY_ATTEMPT_HEADER, (attempt - 1).to_string())
                .send()
                .await;
            let wait = match sent {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<T>()
                        .await
                        .with_context(|| format!("failed to decode github {operation}"));
                }
                Ok(response) => {
                    let status = response.status();
                    let transient = is_transient_response(status, response.headers());
                    let hint = retry_after_hint(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if !transient || !self.retry.allows_retry_after(attempt) {
                        bail!(
                            "github api {operation} failed with status {}: {}",
                            status.as_u16(),
                            error_excerpt(&body, ERROR_EXCERPT_CHARS)
                        );
                    }
                    warn!(
                        operation,
                        status = status.as_u16(),
                        attempt,
                        "retrying github api request"
                    );
                    self.retry.backoff(attempt, hint)
                }
                Err(error) => {
                    if !is_transient_transport(&error) || !self.retry.allows_retry_after(attempt) {
                        return Err(error)
                            .with_context(|| format!("github api {operation} request failed"));
                    }
                    warn!(operation, attempt, error = %error, "retrying github api request");
                    self.retry.backoff(attempt, None)
                }
            };
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl CommentStore for GithubApiClient {
    async fn list_comments(&self, thread: &ThreadRef) -> Result<Vec<GithubIssueComment>> {
        self.list_issue_comments(thread).await
    }

    async fn create_comment(&self, thread: &ThreadRef, body: &str) -> Result<GithubIssueComment> {
        self.create_issue_comment(thread, body).await
    }

    async fn edit_comment(
        &self,
        thread: &ThreadRef,
        comment_id: u64,
        body: &str,
    ) -> Result<GithubIssueComment> {
        self.update_issue_comment(thread, comment_id, body).await
    }
}
