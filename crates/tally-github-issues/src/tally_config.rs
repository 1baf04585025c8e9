use std::collections::BTreeSet;

pub const DEFAULT_BOT_LOGIN: &str = "robotally";
pub const DEFAULT_PROTECTED_BRANCH: &str = "master";
pub const DEFAULT_DISABLED_REACTIONS: &[&str] = &[":+1:", ":-1:"];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable engine configuration shared by the classifier, aggregator and reconciler.
pub struct TallyConfig {
    pub bot_login: String,
    pub disabled_reactions: BTreeSet<String>,
    pub protected_branch: String,
    pub allowed_secrets: Vec<String>,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            bot_login: DEFAULT_BOT_LOGIN.to_string(),
            disabled_reactions: build_disabled_reactions(DEFAULT_DISABLED_REACTIONS.iter().copied()),
            protected_branch: DEFAULT_PROTECTED_BRANCH.to_string(),
            allowed_secrets: Vec::new(),
        }
    }
}

impl TallyConfig {
    pub fn is_bot(&self, login: &str) -> bool {
        login == self.bot_login
    }

    pub fn requires_signature(&self) -> bool {
        !self.allowed_secrets.is_empty()
    }
}

/// Normalize a reaction short code so `tada` and `:tada:` both match `:tada:`.
pub fn normalize_reaction_code(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(':');
    if trimmed.is_empty() {
        return String::new();
    }
    format!(":{}:", trimmed.to_ascii_lowercase())
}

/// Build the normalized disabled-reaction set from CLI or configuration values.
pub fn build_disabled_reactions<'a>(codes: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    codes
        .into_iter()
        .map(normalize_reaction_code)
        .filter(|code| !code.is_empty())
        .collect()
}
