use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

const MAX_BACKOFF: Duration = Duration::from_secs(30);
const MAX_BACKOFF_DOUBLINGS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Attempt budget and exponential backoff for GitHub API calls.
pub(crate) struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_attempts: usize, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms.max(1)),
        }
    }

    /// Whether a failed `attempt` (1-based) may be followed by another one.
    pub(crate) fn allows_retry_after(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }

    /// Wait before the attempt following `attempt`. A server hint is honored but
    /// never undercuts the base delay.
    pub(crate) fn backoff(&self, attempt: usize, server_hint: Option<Duration>) -> Duration {
        if let Some(hint) = server_hint {
            return hint.max(self.base_delay);
        }
        let doublings = (attempt.saturating_sub(1) as u32).min(MAX_BACKOFF_DOUBLINGS);
        self.base_delay
            .saturating_mul(1_u32 << doublings)
            .min(MAX_BACKOFF)
    }
}

/// Seconds-valued `retry-after` hint, if GitHub sent one.
pub(crate) fn retry_after_hint(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Rate limits and server-side failures are worth another attempt. GitHub reports
/// an exhausted primary rate limit as 403 with `x-ratelimit-remaining: 0`.
pub(crate) fn is_transient_response(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|remaining| remaining.trim() == "0")
}

pub(crate) fn is_transient_transport(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// First `limit` characters of an error body, for inclusion in error messages.
pub(crate) fn error_excerpt(body: &str, limit: usize) -> String {
    let body = body.trim();
    match body.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
