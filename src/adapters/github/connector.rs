//! GitHub HTTP connector with quota gating.
//!
//! Every request a source makes goes through [`Connector::get`], which
//! draws one unit from a locally cached copy of the account's core REST
//! budget. When the cache runs dry the connector asks `GET /rate_limit`
//! for the real figure before letting the request through, or refuses it
//! when GitHub reports the budget as exhausted.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::domain::errors::{SourceError, SourceResult};
use crate::domain::models::GithubConfig;

use super::models::RateLimitResponse;

/// Base URL for the GitHub REST API v3.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared, quota-aware GitHub client.
///
/// One connector is created at startup and handed to every source as an
/// `Arc<Connector>`. The remaining-request counter sits behind an async
/// mutex that is held across the whole check-decrement-or-refresh
/// sequence, so concurrent callers can never overdraw the budget and an
/// exhausted counter is refreshed at most once.
pub struct Connector {
    /// The underlying HTTP client.
    http: Client,
    /// GitHub personal access token.
    auth_token: String,
    /// API root, without trailing slash.
    api_base_url: String,
    /// Requests we believe are left in the current window.
    remaining_requests: Mutex<i64>,
}

impl Connector {
    /// Create a connector for the public GitHub API.
    pub fn new(auth_token: impl Into<String>) -> SourceResult<Self> {
        Self::with_base_url(
            auth_token,
            GITHUB_API_BASE,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a connector from the `github` configuration section.
    pub fn from_config(config: &GithubConfig) -> SourceResult<Self> {
        Self::with_base_url(
            config.auth_token.clone(),
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Create a connector against an arbitrary API root (GitHub Enterprise, tests).
    pub fn with_base_url(
        auth_token: impl Into<String>,
        api_base_url: &str,
        timeout: Duration,
    ) -> SourceResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            auth_token: auth_token.into(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            remaining_requests: Mutex::new(0),
        })
    }

    /// Seed the local counter, e.g. with a budget that is already known.
    ///
    /// A fresh connector starts at zero, so its first gated call refreshes.
    #[must_use]
    pub fn with_remaining_requests(self, remaining: i64) -> Self {
        Self {
            remaining_requests: Mutex::new(remaining),
            ..self
        }
    }

    /// Absolute URL for an API path such as `/rate_limit`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Current value of the local request counter.
    pub async fn remaining_requests(&self) -> i64 {
        *self.remaining_requests.lock().await
    }

    /// Issue a quota-gated `GET`.
    ///
    /// Consumes one unit of budget once the gate lets the call through.
    /// Non-2xx responses become [`SourceError::Remote`]; nothing is retried.
    pub async fn get(&self, url: &str) -> SourceResult<Response> {
        self.acquire().await?;
        self.send(url).await
    }

    /// Issue a quota-gated `GET` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> SourceResult<T> {
        let response = self.get(url).await?;
        read_json(response).await
    }

    /// Ask GitHub for the current quota.
    ///
    /// This call bypasses the gate: `/rate_limit` does not count against
    /// the budget, and gating it would recurse into the refresh.
    pub async fn fetch_rate_limit(&self) -> SourceResult<RateLimitResponse> {
        let response = self.send(&self.api_url("/rate_limit")).await?;
        read_json(response).await
    }

    /// Take one unit of budget, refreshing the counter first when it is empty.
    async fn acquire(&self) -> SourceResult<()> {
        let mut remaining = self.remaining_requests.lock().await;
        if *remaining > 0 {
            *remaining -= 1;
            return Ok(());
        }

        let core = self.fetch_rate_limit().await?.resources.core;
        if core.remaining <= 0 {
            let reset_at = core.reset_at();
            tracing::warn!(
                limit = core.limit,
                reset_at = ?reset_at,
                "GitHub rate limit exhausted, refusing request"
            );
            return Err(SourceError::RateLimitExceeded { reset_at });
        }

        // One unit is reserved for the request about to be sent.
        *remaining = core.remaining - 1;
        tracing::debug!(
            remaining = *remaining,
            limit = core.limit,
            "Refreshed GitHub request budget"
        );
        Ok(())
    }

    /// Send an authorized `GET` without touching the budget.
    async fn send(&self, url: &str) -> SourceResult<Response> {
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("token {}", self.auth_token))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header(USER_AGENT, concat!("extra/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("api_base_url", &self.api_base_url)
            .field("auth_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Read the whole body, then decode it.
///
/// Reading and decoding are split so that a dropped connection surfaces
/// as [`SourceError::Network`] and a malformed payload as
/// [`SourceError::Decode`].
async fn read_json<T: DeserializeOwned>(response: Response) -> SourceResult<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
