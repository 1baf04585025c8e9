use thiserror::Error;

#[derive(Debug, Error)]
/// Failures that terminate handling of a single webhook notification.
pub enum TallyError {
    #[error("invalid github event: {0}")]
    MalformedInput(String),
    #[error("non-supported action: {0}")]
    UnsupportedAction(String),
    #[error("webhook signature verification failed")]
    InvalidSignature,
    #[error("comment store failure: {0:#}")]
    Upstream(#[from] anyhow::Error),
}

impl TallyError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedInput(_) => 400,
            Self::InvalidSignature => 401,
            Self::UnsupportedAction(_) => 405,
            Self::Upstream(_) => 500,
        }
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::InvalidSignature => "invalid_signature",
            Self::UnsupportedAction(_) => "unsupported_action",
            Self::Upstream(_) => "upstream_failure",
        }
    }
}
