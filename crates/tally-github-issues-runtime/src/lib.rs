//! Runtime crate for the robotally GitHub webhook service.
//!
//! Provides the GitHub REST comment store, webhook signature checks, and the
//! axum server that drives the `tally-github-issues` engine.

pub mod tally_runtime;

pub use tally_runtime::{
    authenticate_delivery, build_tally_webhook_router, process_webhook_delivery,
    process_webhook_payload, replay_webhook_event_file, run_tally_webhook_server, GithubApiClient,
    GithubApiClientConfig, TallyServerState,
};
