//! Webhook runtime: signature checks, classification, and report reconciliation
//! against the GitHub comment store.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tally_github_issues::issue_event_action::parse_webhook_event;
use tally_github_issues::{
    classify_event, handle_event_intent, CommentStore, ReconcileOutcome, TallyConfig, TallyError,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

mod github_api_client;
mod github_retry;
mod webhook_server;
mod webhook_signature;

pub use github_api_client::{GithubApiClient, GithubApiClientConfig};
pub use webhook_server::build_tally_webhook_router;

use webhook_signature::verify_webhook_signature;

#[derive(Clone)]
/// Immutable state shared by every webhook request.
pub struct TallyServerState {
    pub config: TallyConfig,
    pub store: Arc<dyn CommentStore>,
}

impl TallyServerState {
    pub fn new(config: TallyConfig, store: Arc<dyn CommentStore>) -> Self {
        Self { config, store }
    }
}

/// Check a delivery's `x-hub-signature-256` header when secrets are configured.
pub fn authenticate_delivery(
    state: &TallyServerState,
    signature_header: Option<&str>,
    body: &[u8],
) -> Result<(), TallyError> {
    if !state.config.requires_signature() {
        return Ok(());
    }
    verify_webhook_signature(
        body,
        signature_header.unwrap_or_default(),
        &state.config.allowed_secrets,
    )
    .map_err(|error| {
        warn!(error = %error, "rejected webhook delivery");
        TallyError::InvalidSignature
    })
}

/// Handle one signed webhook delivery end to end.
pub async fn process_webhook_delivery(
    state: &TallyServerState,
    signature_header: Option<&str>,
    body: &[u8],
) -> Result<ReconcileOutcome, TallyError> {
    authenticate_delivery(state, signature_header, body)?;
    process_webhook_payload(state, body).await
}

/// Classify a trusted payload and reconcile the thread report.
pub async fn process_webhook_payload(
    state: &TallyServerState,
    body: &[u8],
) -> Result<ReconcileOutcome, TallyError> {
    let event = parse_webhook_event(body)?;
    let intent = classify_event(&event, &state.config)?;
    handle_event_intent(state.store.as_ref(), &state.config, &intent, Utc::now()).await
}

/// Process a saved webhook payload once, skipping signature checks.
pub async fn replay_webhook_event_file(
    state: &TallyServerState,
    path: &Path,
) -> Result<ReconcileOutcome> {
    let body = std::fs::read(path)
        .with_context(|| format!("failed to read webhook payload {}", path.display()))?;
    let outcome = process_webhook_payload(state, &body)
        .await
        .with_context(|| format!("failed to replay webhook payload {}", path.display()))?;
    Ok(outcome)
}

/// Serve the webhook endpoints until ctrl-c.
pub async fn run_tally_webhook_server(state: TallyServerState, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve webhook bound address")?;
    info!(
        addr = %local_addr,
        bot_login = %state.config.bot_login,
        signature_checks = state.config.requires_signature(),
        "robotally webhook server listening"
    );

    let app = build_tally_webhook_router(Arc::new(state));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("robotally webhook server exited unexpectedly")?;
    Ok(())
}
