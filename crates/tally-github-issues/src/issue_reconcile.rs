use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::github_event_payload::{GithubIssueComment, ThreadRef};
use crate::issue_event_action::EventIntent;
use crate::issue_render::render_tally_report;
use crate::reaction_extraction::extract_report_warning;
use crate::reaction_tally::aggregate_thread_reactions;
use crate::tally_config::TallyConfig;
use crate::tally_error::TallyError;

#[async_trait]
/// Remote storage of thread comments.
pub trait CommentStore: Send + Sync {
    /// All comments of the thread in creation order.
    async fn list_comments(&self, thread: &ThreadRef) -> Result<Vec<GithubIssueComment>>;

    async fn create_comment(&self, thread: &ThreadRef, body: &str) -> Result<GithubIssueComment>;

    async fn edit_comment(
        &self,
        thread: &ThreadRef,
        comment_id: u64,
        body: &str,
    ) -> Result<GithubIssueComment>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where the rendered report has to land.
pub enum ReconcileTarget<'a> {
    NewThread,
    Existing(&'a [GithubIssueComment]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ReconcileOutcome` values.
pub enum ReconcileOutcome {
    Ignored,
    Created { comment_id: u64 },
    Edited { comment_id: u64 },
    Skipped,
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::Created { .. } => "created",
            Self::Edited { .. } => "edited",
            Self::Skipped => "skipped",
        }
    }
}

/// First comment authored by the bot, in creation order.
pub fn find_report_comment<'a>(
    comments: &'a [GithubIssueComment],
    bot_login: &str,
) -> Option<&'a GithubIssueComment> {
    comments.iter().find(|comment| comment.user.login == bot_login)
}

/// Create the report on a new thread or replace the existing one in place.
///
/// A refresh without a prior report comment is dropped: only thread creation
/// may introduce the report.
pub async fn reconcile_report(
    store: &dyn CommentStore,
    thread: &ThreadRef,
    report: &str,
    target: ReconcileTarget<'_>,
    bot_login: &str,
) -> Result<ReconcileOutcome> {
    match target {
        ReconcileTarget::NewThread => {
            let created = store.create_comment(thread, report).await?;
            Ok(ReconcileOutcome::Created {
                comment_id: created.id,
            })
        }
        ReconcileTarget::Existing(comments) => {
            let Some(existing) = find_report_comment(comments, bot_login) else {
                return Ok(ReconcileOutcome::Skipped);
            };
            store.edit_comment(thread, existing.id, report).await?;
            Ok(ReconcileOutcome::Edited {
                comment_id: existing.id,
            })
        }
    }
}

/// Run one classified notification through aggregation, rendering and reconciliation.
pub async fn handle_event_intent(
    store: &dyn CommentStore,
    config: &TallyConfig,
    intent: &EventIntent,
    now: DateTime<Utc>,
) -> Result<ReconcileOutcome, TallyError> {
    let outcome = match intent {
        EventIntent::Ignore => ReconcileOutcome::Ignored,
        EventIntent::Initialize { thread, warning } => {
            let report = render_tally_report(warning.as_deref(), &Default::default(), now);
            reconcile_report(
                store,
                thread,
                &report,
                ReconcileTarget::NewThread,
                &config.bot_login,
            )
            .await?
        }
        EventIntent::Refresh { thread } => {
            let comments = store.list_comments(thread).await?;
            let tally = aggregate_thread_reactions(
                &comments,
                &config.bot_login,
                &config.disabled_reactions,
            );
            let warning = find_report_comment(&comments, &config.bot_login)
                .and_then(|comment| extract_report_warning(comment.body_text()));
            debug!(
                thread = %thread.slug(),
                comments = comments.len(),
                voters = tally.votes.len(),
                reactions = tally.reactions.len(),
                "aggregated thread reactions"
            );
            let report = render_tally_report(warning.as_deref(), &tally, now);
            reconcile_report(
                store,
                thread,
                &report,
                ReconcileTarget::Existing(&comments),
                &config.bot_login,
            )
            .await?
        }
    };
    info!(
        intent = intent.as_str(),
        outcome = outcome.as_str(),
        "handled thread notification"
    );
    Ok(outcome)
}
