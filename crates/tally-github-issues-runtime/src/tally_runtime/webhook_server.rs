use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tally_github_issues::TallyError;
use tracing::warn;

use super::webhook_signature::SIGNATURE_HEADER;
use super::{authenticate_delivery, process_webhook_delivery, TallyServerState};

const GITHUB_EVENT_HEADER: &str = "x-github-event";

pub fn build_tally_webhook_router(state: Arc<TallyServerState>) -> Router {
    Router::new()
        .route("/", post(handle_github_webhook))
        .route("/webhooks/github", post(handle_github_webhook))
        .route("/healthz", get(handle_webhook_health))
        .with_state(state)
}

async fn handle_webhook_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status":"ok"})))
}

async fn handle_github_webhook(
    State(state): State<Arc<TallyServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let signature = header_value(&headers, SIGNATURE_HEADER);
    if header_value(&headers, GITHUB_EVENT_HEADER) == Some("ping") {
        return match authenticate_delivery(&state, signature, &body) {
            Ok(()) => (StatusCode::OK, Json(json!({"status":"pong"}))),
            Err(error) => error_response(&error),
        };
    }

    match process_webhook_delivery(&state, signature, &body).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({"status":"ok","outcome":outcome.as_str()})),
        ),
        Err(error) => {
            if matches!(error, TallyError::Upstream(_)) {
                warn!(error = %error, "webhook handling failed upstream");
            }
            error_response(&error)
        }
    }
}

fn error_response(error: &TallyError) -> (StatusCode, Json<Value>) {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({"error":{"code":error.reason_code(),"message":error.to_string()}})),
    )
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}
