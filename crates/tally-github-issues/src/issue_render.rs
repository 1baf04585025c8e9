use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::reaction_extraction::{DOWNVOTE_MARKER, UPVOTE_MARKER, WARNING_DELIMITER};
use crate::reaction_tally::ThreadTally;

pub const REPORT_TIMESTAMP_FORMAT: &str = "%a %b %-d %H:%M:%S UTC %Y";

/// Render the status report for a thread.
///
/// The output depends only on the inputs; `rendered_at` is the sole source of
/// variation between two renders of the same tally.
pub fn render_tally_report(
    warning: Option<&str>,
    tally: &ThreadTally,
    rendered_at: DateTime<Utc>,
) -> String {
    let mut report = String::new();
    if let Some(warning) = warning.filter(|warning| !warning.trim().is_empty()) {
        report.push_str(&format!(
            "{WARNING_DELIMITER} {warning} {WARNING_DELIMITER}\n\n"
        ));
    }

    let (approve, reject) = tally.partition_votes();
    report.push_str("| Vote | Count | Reviewers |\n| :---: | :---: | :---: |\n");
    report.push_str(&format!(
        "| {UPVOTE_MARKER} | {} | {} |\n",
        approve.len(),
        mention_users(approve)
    ));
    report.push_str(&format!(
        "| {DOWNVOTE_MARKER} | {} | {} |",
        reject.len(),
        mention_users(reject)
    ));

    if !tally.reactions.is_empty() {
        report.push_str("\n\n| Reaction | Users |\n| :---: | :---: |\n");
        for (code, users) in order_reactions_by_popularity(&tally.reactions) {
            report.push_str(&format!(
                "| {code} | {} |\n",
                mention_users(users.iter().map(String::as_str))
            ));
        }
    }

    report.push_str(&format!(
        "\n\n_Updated: {}_",
        rendered_at.format(REPORT_TIMESTAMP_FORMAT)
    ));
    report
}

/// Reaction codes ordered by descending user count, ties by ascending code.
pub fn order_reactions_by_popularity(
    reactions: &BTreeMap<String, BTreeSet<String>>,
) -> Vec<(&str, &BTreeSet<String>)> {
    let mut ordered = reactions
        .iter()
        .map(|(code, users)| (code.as_str(), users))
        .collect::<Vec<_>>();
    // BTreeMap iteration is already code-ascending, so a stable sort on count keeps the tie-break.
    ordered.sort_by(|left, right| right.1.len().cmp(&left.1.len()));
    ordered
}

fn mention_users<'a>(users: impl IntoIterator<Item = &'a str>) -> String {
    users
        .into_iter()
        .map(|user| format!("@{user}"))
        .collect::<Vec<_>>()
        .join(" ")
}
