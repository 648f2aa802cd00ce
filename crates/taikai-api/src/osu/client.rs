//! `OsuClient` - osu! API v2 client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use crate::error::ApiError;

use super::api::LocalOsuApi;
use super::token::{Credentials, DEFAULT_TOKEN_URL, TokenManager};
use super::types::{Beatmap, Beatmapset, RawBeatmap, RawBeatmapset, RawUser, UserProfile};

/// Default base URL for the osu! API v2.
pub const DEFAULT_BASE_URL: &str = "https://osu.ppy.sh/api/v2/";

/// Budget for one upstream request, including reading the body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// osu! API v2 client.
///
/// Owns the process-wide token cache; cloneable handles are not provided,
/// share it behind `Arc` instead.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OsuClient {
    /// HTTP client (reqwest, gzip enabled).
    http_client: Client,
    /// Base URL for resource requests.
    base_url: Url,
    /// Token cache and refresh.
    token_manager: TokenManager,
    /// Per-request time budget.
    request_timeout: Duration,
}

/// Builder for `OsuClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OsuClientBuilder {
    base_url: Option<Url>,
    token_url: Option<Url>,
    credentials: Option<Credentials>,
    user_agent: Option<String>,
    request_timeout: Option<Duration>,
}

impl OsuClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            token_url: None,
            credentials: None,
            user_agent: None,
            request_timeout: None,
        }
    }

    /// Overrides the resource base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Overrides the token endpoint URL (for wiremock in tests).
    #[must_use]
    pub fn token_url(mut self, url: Url) -> Self {
        self.token_url = Some(url);
        self
    }

    /// Sets the OAuth client credentials (required).
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the per-request time budget (default: 5s).
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `credentials` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<OsuClient> {
        let credentials = self.credentials.context("credentials are required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let token_url = if let Some(url) = self.token_url {
            url
        } else {
            let result = Url::parse(DEFAULT_TOKEN_URL);
            result.context("invalid default token URL")?
        };

        let request_timeout = self.request_timeout.unwrap_or(REQUEST_TIMEOUT);

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        let token_manager = TokenManager::new(
            http_client.clone(),
            token_url,
            credentials,
            request_timeout,
        );

        Ok(OsuClient {
            http_client,
            base_url,
            token_manager,
            request_timeout,
        })
    }
}

impl OsuClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> OsuClientBuilder {
        OsuClientBuilder::new()
    }

    /// Sends a bearer-authorized GET and decodes the JSON body.
    ///
    /// The whole exchange races the request timeout; if the timer fires
    /// first the in-flight request is dropped and no partial data escapes.
    #[instrument(skip_all)]
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let token = self.token_manager.token().await?;

        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Request(format!("failed to join URL path {path}: {e}")))?;

        tracing::debug!(%url, "osu! API request");

        let exchange = async {
            let response = self
                .http_client
                .get(url.clone())
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| ApiError::Request(format!("request failed: {path}: {e}")))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::Request(format!("failed to read body: {path}: {e}")))?;
            Ok::<_, ApiError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| {
                tracing::warn!(path, timeout = ?self.request_timeout, "osu! API request timed out");
                ApiError::Timeout(self.request_timeout)
            })??;

        if !status.is_success() {
            tracing::warn!(path, %status, "osu! API error response");
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Request(format!("failed to decode JSON response: {path}: {e}")))
    }
}

impl LocalOsuApi for OsuClient {
    #[instrument(skip(self))]
    async fn fetch_user_profile(&self, user_id: u64) -> Result<UserProfile, ApiError> {
        let raw: RawUser = self.get_json(&format!("users/{user_id}")).await?;
        Ok(UserProfile::from_raw(user_id, raw))
    }

    #[instrument(skip(self))]
    async fn fetch_beatmap(&self, beatmap_id: u64) -> Result<Beatmap, ApiError> {
        let raw: RawBeatmap = self.get_json(&format!("beatmaps/{beatmap_id}")).await?;
        Ok(Beatmap::from_raw(raw))
    }

    #[instrument(skip(self))]
    async fn fetch_beatmapset(&self, beatmapset_id: u64) -> Result<Beatmapset, ApiError> {
        let raw: RawBeatmapset = self.get_json(&format!("beatmapsets/{beatmapset_id}")).await?;
        Ok(Beatmapset::from_raw(raw))
    }
}
