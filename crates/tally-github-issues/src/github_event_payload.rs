use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// A comment as returned by the issue comments API, in creation order.
pub struct GithubIssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: String,
    pub user: GithubUser,
}

impl GithubIssueComment {
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookIssue {
    pub number: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookBranchRef {
    #[serde(rename = "ref")]
    pub branch: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookPullRequest {
    pub number: u64,
    #[serde(default)]
    pub base: Option<WebhookBranchRef>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookRepository {
    pub name: String,
    #[serde(default)]
    pub owner: Option<GithubUser>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
/// Webhook notification for `issues`, `pull_request` and `issue_comment` events.
///
/// Every field is optional at the wire level; the classifier decides which
/// ones the action actually needs.
pub struct GithubWebhookEvent {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub issue: Option<WebhookIssue>,
    #[serde(default)]
    pub pull_request: Option<WebhookPullRequest>,
    #[serde(default)]
    pub repository: Option<WebhookRepository>,
    #[serde(default)]
    pub sender: Option<GithubUser>,
}

impl GithubWebhookEvent {
    pub fn sender_login(&self) -> Option<&str> {
        self.sender.as_ref().map(|sender| sender.login.as_str())
    }

    /// The opened thread. The issue number wins when both are present; the pull
    /// request's base branch is kept either way.
    pub fn subject(&self) -> Option<ThreadSubject> {
        let issue_number = self.issue.as_ref().map(|issue| issue.number);
        match &self.pull_request {
            Some(pull_request) => Some(ThreadSubject::PullRequest {
                number: issue_number.unwrap_or(pull_request.number),
                base_branch: pull_request
                    .base
                    .as_ref()
                    .map(|base| base.branch.clone())
                    .unwrap_or_default(),
            }),
            None => issue_number.map(|number| ThreadSubject::Issue { number }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The thread a notification refers to: either an issue or a pull request.
pub enum ThreadSubject {
    Issue { number: u64 },
    PullRequest { number: u64, base_branch: String },
}

impl ThreadSubject {
    pub fn number(&self) -> u64 {
        match self {
            Self::Issue { number } | Self::PullRequest { number, .. } => *number,
        }
    }

    /// Warning banner text for pull requests targeting the protected branch.
    pub fn base_branch_warning(&self, protected_branch: &str) -> Option<String> {
        match self {
            Self::PullRequest { base_branch, .. }
                if !protected_branch.is_empty() && base_branch == protected_branch =>
            {
                Some(format!("Pull request against `{base_branch}`"))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Owner/repository/number triple identifying one discussion thread.
pub struct ThreadRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl ThreadRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    pub fn slug(&self) -> String {
        format!("{}/{}#{}", self.owner, self.repo, self.number)
    }
}
