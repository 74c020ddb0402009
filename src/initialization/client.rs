//! HTTP client initialization.
//!
//! Two clients are kept: one that follows redirects for page fetches,
//! and one with redirects disabled so the redirect collector can walk
//! the chain manually.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;

/// Initializes the HTTP client used for page and provider fetches.
///
/// Redirects are followed (reqwest's default, up to 10 hops) and the
/// configured User-Agent and timeout are applied.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the HTTP client for redirect resolution.
///
/// Redirects are disabled so the redirect collector can capture the full
/// chain including intermediate URLs.
pub fn init_redirect_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
