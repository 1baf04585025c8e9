use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

pub const UPVOTE_MARKER: &str = ":+1:";
pub const DOWNVOTE_MARKER: &str = ":-1:";
pub const WARNING_DELIMITER: &str = ":exclamation:";

static REACTION_CODE_PATTERN: OnceLock<Regex> = OnceLock::new();
static REPORT_WARNING_PATTERN: OnceLock<Regex> = OnceLock::new();

fn reaction_code_pattern() -> &'static Regex {
    REACTION_CODE_PATTERN
        .get_or_init(|| Regex::new(r":[a-z0-9_]+:").expect("reaction code pattern compiles"))
}

fn report_warning_pattern() -> &'static Regex {
    REPORT_WARNING_PATTERN.get_or_init(|| {
        Regex::new(r":exclamation: (.*) :exclamation:").expect("warning pattern compiles")
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Vote and reaction markers found in a single comment.
pub struct CommentReactions {
    pub vote: Option<bool>,
    pub reactions: BTreeSet<String>,
}

/// Scan one comment body for vote markers and reaction short codes.
///
/// When both vote markers are present the up-vote wins.
pub fn extract_comment_reactions(body: &str, disabled: &BTreeSet<String>) -> CommentReactions {
    let vote = if body.contains(UPVOTE_MARKER) {
        Some(true)
    } else if body.contains(DOWNVOTE_MARKER) {
        Some(false)
    } else {
        None
    };
    let reactions = reaction_code_pattern()
        .find_iter(body)
        .map(|code| code.as_str())
        .filter(|code| !disabled.contains(*code))
        .map(str::to_string)
        .collect();
    CommentReactions { vote, reactions }
}

/// Recover the warning banner embedded in a previously rendered report.
pub fn extract_report_warning(report_body: &str) -> Option<String> {
    report_warning_pattern()
        .captures(report_body)
        .and_then(|captures| captures.get(1))
        .map(|warning| warning.as_str().to_string())
        .filter(|warning| !warning.trim().is_empty())
}
