//! Reaction aggregation and report reconciliation for GitHub issue threads.
//! This crate classifies webhook notifications, tallies vote and reaction
//! markers from comment history, renders the status report, and keeps a
//! single report comment per thread in sync through a `CommentStore`.

pub mod github_event_payload;
pub mod issue_event_action;
pub mod issue_reconcile;
pub mod issue_render;
pub mod reaction_extraction;
pub mod reaction_tally;
pub mod tally_config;
pub mod tally_error;

pub use github_event_payload::{
    GithubIssueComment, GithubUser, GithubWebhookEvent, ThreadRef, ThreadSubject,
};
pub use issue_event_action::{classify_event, EventIntent};
pub use issue_reconcile::{handle_event_intent, reconcile_report, CommentStore, ReconcileOutcome};
pub use issue_render::render_tally_report;
pub use reaction_extraction::{extract_comment_reactions, extract_report_warning, CommentReactions};
pub use reaction_tally::{aggregate_thread_reactions, ThreadTally};
pub use tally_config::TallyConfig;
pub use tally_error::TallyError;
