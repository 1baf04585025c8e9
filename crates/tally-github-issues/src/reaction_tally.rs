use std::collections::{BTreeMap, BTreeSet};

use crate::github_event_payload::GithubIssueComment;
use crate::reaction_extraction::extract_comment_reactions;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Thread-wide votes (user -> approve) and reactions (code -> users).
pub struct ThreadTally {
    pub votes: BTreeMap<String, bool>,
    pub reactions: BTreeMap<String, BTreeSet<String>>,
}

impl ThreadTally {
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty() && self.reactions.is_empty()
    }

    /// Approving and rejecting users, each sorted ascending.
    pub fn partition_votes(&self) -> (Vec<&str>, Vec<&str>) {
        let mut approve = Vec::new();
        let mut reject = Vec::new();
        for (user, approved) in &self.votes {
            if *approved {
                approve.push(user.as_str());
            } else {
                reject.push(user.as_str());
            }
        }
        (approve, reject)
    }
}

/// Fold the comment history into vote and reaction tallies.
///
/// Comments authored by `bot_login` never count. A later vote from the same
/// user overwrites an earlier one.
pub fn aggregate_thread_reactions(
    comments: &[GithubIssueComment],
    bot_login: &str,
    disabled: &BTreeSet<String>,
) -> ThreadTally {
    let mut tally = ThreadTally::default();
    for comment in comments {
        if comment.user.login == bot_login {
            continue;
        }
        let extracted = extract_comment_reactions(comment.body_text(), disabled);
        if let Some(vote) = extracted.vote {
            tally.votes.insert(comment.user.login.clone(), vote);
        }
        for code in extracted.reactions {
            tally
                .reactions
                .entry(code)
                .or_default()
                .insert(comment.user.login.clone());
        }
    }
    tally
}
