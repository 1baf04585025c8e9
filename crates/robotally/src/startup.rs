use std::sync::Arc;

use anyhow::{bail, Result};
use tally_github_issues::tally_config::build_disabled_reactions;
use tally_github_issues::TallyConfig;
use tally_github_issues_runtime::{
    replay_webhook_event_file, run_tally_webhook_server, GithubApiClient, GithubApiClientConfig,
    TallyServerState,
};
use tracing::warn;

use crate::cli_args::Cli;

pub(crate) fn build_tally_config(cli: &Cli) -> Result<TallyConfig> {
    let bot_login = cli.bot_login.trim();
    if bot_login.is_empty() {
        bail!("--bot-login cannot be empty");
    }
    Ok(TallyConfig {
        bot_login: bot_login.to_string(),
        disabled_reactions: build_disabled_reactions(
            cli.disabled_reactions.iter().map(String::as_str),
        ),
        protected_branch: cli.protected_branch.trim().to_string(),
        allowed_secrets: cli
            .webhook_secrets
            .iter()
            .map(|secret| secret.trim())
            .filter(|secret| !secret.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

pub(crate) fn build_github_client_config(cli: &Cli) -> Result<GithubApiClientConfig> {
    if cli.retry_max_attempts == 0 {
        bail!("--retry-max-attempts must be at least 1");
    }
    let token = cli.github_token.as_deref().unwrap_or_default().trim();
    if token.is_empty() {
        warn!("no github token configured; comment API calls will be unauthenticated");
    }
    Ok(GithubApiClientConfig {
        api_base: cli.github_api_base.clone(),
        token: token.to_string(),
        request_timeout_ms: cli.request_timeout_ms,
        retry_max_attempts: cli.retry_max_attempts,
        retry_base_delay_ms: cli.retry_base_delay_ms,
    })
}

pub(crate) async fn run_cli(cli: Cli) -> Result<()> {
    let config = build_tally_config(&cli)?;
    let client = GithubApiClient::new(build_github_client_config(&cli)?)?;
    let state = TallyServerState::new(config, Arc::new(client));

    if let Some(path) = cli.replay_event.as_deref() {
        let outcome = replay_webhook_event_file(&state, path).await?;
        println!(
            "robotally replay: path={} outcome={}",
            path.display(),
            outcome.as_str()
        );
        return Ok(());
    }
    run_tally_webhook_server(state, &cli.bind).await
}
