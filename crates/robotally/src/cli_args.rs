use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "robotally",
    about = "GitHub webhook that tallies votes and reactions into a single report comment",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "bind",
        env = "ROBOTALLY_BIND",
        default_value = "127.0.0.1:8080",
        help = "Socket address the webhook server listens on"
    )]
    pub(crate) bind: String,

    #[arg(
        long = "github-api-base",
        env = "ROBOTALLY_GITHUB_API_BASE",
        default_value = "https://api.github.com",
        help = "Base URL of the GitHub REST API"
    )]
    pub(crate) github_api_base: String,

    #[arg(
        long = "github-token",
        env = "ROBOTALLY_GITHUB_TOKEN",
        hide_env_values = true,
        help = "Token used to list, create and edit issue comments"
    )]
    pub(crate) github_token: Option<String>,

    #[arg(
        long = "bot-login",
        env = "ROBOTALLY_BOT_LOGIN",
        default_value = tally_github_issues::tally_config::DEFAULT_BOT_LOGIN,
        help = "GitHub login the report comments are authored by"
    )]
    pub(crate) bot_login: String,

    #[arg(
        long = "webhook-secret",
        env = "ROBOTALLY_WEBHOOK_SECRETS",
        value_delimiter = ',',
        hide_env_values = true,
        help = "Allowed webhook secrets; deliveries are not verified when none are configured"
    )]
    pub(crate) webhook_secrets: Vec<String>,

    #[arg(
        long = "disabled-reaction",
        env = "ROBOTALLY_DISABLED_REACTIONS",
        value_delimiter = ',',
        default_values_t = default_disabled_reactions(),
        help = "Reaction short codes that are never tallied"
    )]
    pub(crate) disabled_reactions: Vec<String>,

    #[arg(
        long = "protected-branch",
        env = "ROBOTALLY_PROTECTED_BRANCH",
        default_value = tally_github_issues::tally_config::DEFAULT_PROTECTED_BRANCH,
        help = "Pull requests targeting this branch get a warning banner"
    )]
    pub(crate) protected_branch: String,

    #[arg(
        long = "request-timeout-ms",
        env = "ROBOTALLY_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        help = "Timeout for each GitHub API request"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "ROBOTALLY_RETRY_MAX_ATTEMPTS",
        default_value_t = 1,
        help = "Attempts per GitHub API request; 1 disables retries"
    )]
    pub(crate) retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "ROBOTALLY_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        help = "Base delay for exponential retry backoff"
    )]
    pub(crate) retry_base_delay_ms: u64,

    #[arg(
        long = "replay-event",
        env = "ROBOTALLY_REPLAY_EVENT",
        help = "Process one saved webhook payload and exit instead of serving"
    )]
    pub(crate) replay_event: Option<PathBuf>,
}

fn default_disabled_reactions() -> Vec<String> {
    tally_github_issues::tally_config::DEFAULT_DISABLED_REACTIONS
        .iter()
        .map(|code| code.to_string())
        .collect()
}
