use crate::github_event_payload::{GithubWebhookEvent, ThreadRef};
use crate::tally_config::TallyConfig;
use crate::tally_error::TallyError;

pub const ACTION_OPENED: &str = "opened";
pub const ACTION_CREATED: &str = "created";

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a webhook notification asks the engine to do.
pub enum EventIntent {
    Ignore,
    Initialize {
        thread: ThreadRef,
        warning: Option<String>,
    },
    Refresh {
        thread: ThreadRef,
    },
}

impl EventIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Initialize { .. } => "initialize",
            Self::Refresh { .. } => "refresh",
        }
    }
}

/// Parse a raw webhook body into a notification.
pub fn parse_webhook_event(body: &[u8]) -> Result<GithubWebhookEvent, TallyError> {
    serde_json::from_slice(body).map_err(|error| TallyError::MalformedInput(error.to_string()))
}

/// Map a notification onto an intent, filtering out our own activity.
pub fn classify_event(
    event: &GithubWebhookEvent,
    config: &TallyConfig,
) -> Result<EventIntent, TallyError> {
    let sender = event
        .sender_login()
        .map(str::trim)
        .filter(|login| !login.is_empty())
        .ok_or_else(|| TallyError::MalformedInput("event without sender".into()))?;
    if config.is_bot(sender) {
        return Ok(EventIntent::Ignore);
    }
    match event.action.as_str() {
        ACTION_OPENED => {
            let subject = event.subject().ok_or_else(|| {
                TallyError::MalformedInput("opened event without issue or pull_request".into())
            })?;
            Ok(EventIntent::Initialize {
                thread: resolve_thread(event, subject.number())?,
                warning: subject.base_branch_warning(&config.protected_branch),
            })
        }
        ACTION_CREATED => {
            let issue = event.issue.as_ref().ok_or_else(|| {
                TallyError::MalformedInput("created event without issue".into())
            })?;
            Ok(EventIntent::Refresh {
                thread: resolve_thread(event, issue.number)?,
            })
        }
        other => Err(TallyError::UnsupportedAction(other.to_string())),
    }
}

fn resolve_thread(event: &GithubWebhookEvent, number: u64) -> Result<ThreadRef, TallyError> {
    let repository = event
        .repository
        .as_ref()
        .ok_or_else(|| TallyError::MalformedInput("event without repository".into()))?;
    let owner = repository
        .owner
        .as_ref()
        .map(|owner| owner.login.trim())
        .filter(|login| !login.is_empty())
        .ok_or_else(|| TallyError::MalformedInput("repository without owner login".into()))?;
    if repository.name.trim().is_empty() {
        return Err(TallyError::MalformedInput("repository without name".into()));
    }
    Ok(ThreadRef::new(owner, repository.name.trim(), number))
}

#[cfg(test)]
mod tests {
    use super::{classify_event, parse_webhook_event, EventIntent};
    use crate::github_event_payload::{GithubWebhookEvent, ThreadRef};
    use crate::tally_config::TallyConfig;
    use crate::tally_error::TallyError;
    use serde_json::{json, Value};

    fn event(payload: Value) -> GithubWebhookEvent {
        serde_json::from_value(payload).expect("event payload")
    }

    fn repository() -> Value {
        json!({"name": "repo", "owner": {"login": "owner"}})
    }

    #[test]
    fn unit_classify_event_ignores_self_originated_notifications() {
        let intent = classify_event(
            &event(json!({
                "action": "deleted",
                "repository": repository(),
                "sender": {"login": "robotally"}
            })),
            &TallyConfig::default(),
        )
        .expect("classify");
        assert_eq!(intent, EventIntent::Ignore);
    }

    #[test]
    fn unit_classify_event_rejects_unsupported_actions() {
        let error = classify_event(
            &event(json!({
                "action": "closed",
                "issue": {"number": 4},
                "repository": repository(),
                "sender": {"login": "alice"}
            })),
            &TallyConfig::default(),
        )
        .expect_err("closed is unsupported");
        assert!(matches!(error, TallyError::UnsupportedAction(action) if action == "closed"));
    }

    #[test]
    fn functional_opened_issue_initializes_without_warning() {
        let intent = classify_event(
            &event(json!({
                "action": "opened",
                "issue": {"number": 4},
                "repository": repository(),
                "sender": {"login": "alice"}
            })),
            &TallyConfig::default(),
        )
        .expect("classify");
        assert_eq!(
            intent,
            EventIntent::Initialize {
                thread: ThreadRef::new("owner", "repo", 4),
                warning: None,
            }
        );
    }

    #[test]
    fn functional_opened_pull_request_against_master_attaches_warning() {
        let intent = classify_event(
            &event(json!({
                "action": "opened",
                "pull_request": {"number": 8, "base": {"ref": "master"}},
                "repository": repository(),
                "sender": {"login": "alice"}
            })),
            &TallyConfig::default(),
        )
        .expect("classify");
        assert_eq!(
            intent,
            EventIntent::Initialize {
                thread: ThreadRef::new("owner", "repo", 8),
                warning: Some("Pull request against `master`".to_string()),
            }
        );
    }

    #[test]
    fn functional_protected_branch_is_configurable() {
        let config = TallyConfig {
            protected_branch: "main".to_string(),
            ..TallyConfig::default()
        };
        let payload = event(json!({
            "action": "opened",
            "pull_request": {"number": 8, "base": {"ref": "master"}},
            "repository": repository(),
            "sender": {"login": "alice"}
        }));
        let intent = classify_event(&payload, &config).expect("classify");
        assert!(matches!(intent, EventIntent::Initialize { warning: None, .. }));
    }

    #[test]
    fn functional_created_comment_refreshes_thread() {
        let intent = classify_event(
            &event(json!({
                "action": "created",
                "issue": {"number": 15},
                "comment": {"id": 1, "body": ":+1:"},
                "repository": repository(),
                "sender": {"login": "bob"}
            })),
            &TallyConfig::default(),
        )
        .expect("classify");
        assert_eq!(
            intent,
            EventIntent::Refresh {
                thread: ThreadRef::new("owner", "repo", 15),
            }
        );
    }

    #[test]
    fn regression_missing_fields_are_malformed_instead_of_panicking() {
        let config = TallyConfig::default();
        let no_subject = classify_event(
            &event(json!({"action": "opened", "repository": repository(), "sender": {"login": "a"}})),
            &config,
        );
        assert!(matches!(no_subject, Err(TallyError::MalformedInput(_))));

        let no_issue = classify_event(
            &event(json!({"action": "created", "repository": repository(), "sender": {"login": "a"}})),
            &config,
        );
        assert!(matches!(no_issue, Err(TallyError::MalformedInput(_))));

        let no_repository = classify_event(
            &event(json!({"action": "created", "issue": {"number": 1}, "sender": {"login": "a"}})),
            &config,
        );
        assert!(matches!(no_repository, Err(TallyError::MalformedInput(_))));
    }

    #[test]
    fn regression_senderless_notification_is_malformed_not_refreshed() {
        let config = TallyConfig::default();
        let no_sender = classify_event(
            &event(json!({"action": "created", "issue": {"number": 3}, "repository": repository()})),
            &config,
        );
        assert!(matches!(no_sender, Err(TallyError::MalformedInput(_))));

        let blank_sender = classify_event(
            &event(json!({
                "action": "opened",
                "issue": {"number": 3},
                "repository": repository(),
                "sender": {"login": "  "}
            })),
            &config,
        );
        assert!(matches!(blank_sender, Err(TallyError::MalformedInput(_))));
    }

    #[test]
    fn unit_parse_webhook_event_reports_invalid_json_as_malformed() {
        let error = parse_webhook_event(b"{not json").expect_err("invalid json");
        assert_eq!(error.status_code(), 400);
        let parsed = parse_webhook_event(br#"{"action":"opened"}"#).expect("minimal payload");
        assert_eq!(parsed.action, "opened");
    }
}
