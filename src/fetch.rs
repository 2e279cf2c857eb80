use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/127.0.0.0 Safari/537.36";

/// Shared HTTP client for discovery and page fetches. Several of the
/// target sites refuse default library user agents.
pub fn client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

/// Fetch one page body; non-2xx statuses are errors.
pub async fn get(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request failed: {url}"))?
        .error_for_status()
        .with_context(|| format!("bad status from {url}"))?;
    resp.text()
        .await
        .with_context(|| format!("failed to read body from {url}"))
}
