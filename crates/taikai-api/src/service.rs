//! Process-scoped access-layer service.
//!
//! Owns the state that must live for the process lifetime (the token
//! cache inside the client, the rate-limit table, and one response cache
//! per resource kind) and wires it into the request flow:
//! rate limiter, then cache, then upstream. Construct one instance at
//! startup and hand handlers a shared reference.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::instrument;

use crate::cache::ResponseCache;
use crate::cache::headers::{BEATMAP_CACHE_VERSION, BEATMAP_TTL, PLAYER_CACHE_VERSION, USER_TTL};
use crate::error::ApiError;
use crate::osu::{Beatmap, Beatmapset, LocalOsuApi, OsuClient, UserProfile};
use crate::rate_limit::FixedWindowLimiter;

/// Rate-limited, cached facade over the osu! client.
#[derive(Debug)]
pub struct ApiService {
    client: OsuClient,
    limiter: Arc<Mutex<FixedWindowLimiter>>,
    user_cache: Arc<Mutex<ResponseCache<UserProfile>>>,
    beatmap_cache: Arc<Mutex<ResponseCache<Beatmap>>>,
    beatmapset_cache: Arc<Mutex<ResponseCache<Beatmapset>>>,
}

impl ApiService {
    /// Creates a service with the default request quota (100/min per caller).
    #[must_use]
    pub fn new(client: OsuClient) -> Self {
        Self::with_limiter(client, FixedWindowLimiter::default())
    }

    /// Creates a service with a custom limiter.
    #[must_use]
    pub fn with_limiter(client: OsuClient, limiter: FixedWindowLimiter) -> Self {
        Self {
            client,
            limiter: Arc::new(Mutex::new(limiter)),
            user_cache: Arc::new(Mutex::new(ResponseCache::new())),
            beatmap_cache: Arc::new(Mutex::new(ResponseCache::new())),
            beatmapset_cache: Arc::new(Mutex::new(ResponseCache::new())),
        }
    }

    /// Consumes one unit of the caller's quota.
    async fn consume_quota(&self, caller_key: &str) -> Result<(), ApiError> {
        if self.limiter.lock().await.check_and_consume(caller_key) {
            Ok(())
        } else {
            Err(ApiError::RateLimited)
        }
    }

    /// Returns a user profile, cached for [`USER_TTL`].
    ///
    /// # Errors
    ///
    /// [`ApiError::RateLimited`] when the caller is over quota, otherwise
    /// the underlying fetch errors.
    #[instrument(skip(self))]
    pub async fn user_profile(
        &self,
        caller_key: &str,
        user_id: u64,
    ) -> Result<UserProfile, ApiError> {
        self.consume_quota(caller_key).await?;
        let key = format!("user_{user_id}");
        self.user_cache
            .lock()
            .await
            .get_or_fetch(&key, USER_TTL, PLAYER_CACHE_VERSION, || {
                self.client.fetch_user_profile(user_id)
            })
            .await
    }

    /// Returns a beatmap, cached for [`BEATMAP_TTL`].
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ApiService::user_profile`].
    #[instrument(skip(self))]
    pub async fn beatmap(&self, caller_key: &str, beatmap_id: u64) -> Result<Beatmap, ApiError> {
        self.consume_quota(caller_key).await?;
        let key = format!("beatmap_{beatmap_id}");
        self.beatmap_cache
            .lock()
            .await
            .get_or_fetch(&key, BEATMAP_TTL, BEATMAP_CACHE_VERSION, || {
                self.client.fetch_beatmap(beatmap_id)
            })
            .await
    }

    /// Returns a beatmapset, cached for [`BEATMAP_TTL`].
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ApiService::user_profile`].
    #[instrument(skip(self))]
    pub async fn beatmapset(
        &self,
        caller_key: &str,
        beatmapset_id: u64,
    ) -> Result<Beatmapset, ApiError> {
        self.consume_quota(caller_key).await?;
        let key = format!("beatmapset_{beatmapset_id}");
        self.beatmapset_cache
            .lock()
            .await
            .get_or_fetch(&key, BEATMAP_TTL, BEATMAP_CACHE_VERSION, || {
                self.client.fetch_beatmapset(beatmapset_id)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::osu::Credentials;

    use super::*;

    const TOKEN_BODY: &str =
        r#"{"token_type":"Bearer","expires_in":86400,"access_token":"test-token"}"#;

    async fn service_for(server: &MockServer, limiter: FixedWindowLimiter) -> ApiService {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(TOKEN_BODY, "application/json"))
            .mount(server)
            .await;

        let client = OsuClient::builder()
            .base_url(format!("{}/api/v2/", server.uri()).parse().unwrap())
            .token_url(format!("{}/oauth/token", server.uri()).parse().unwrap())
            .credentials(Credentials::new("1234", "s3cret"))
            .user_agent("taikai/0.0.0")
            .build()
            .unwrap();
        ApiService::with_limiter(client, limiter)
    }

    #[tokio::test]
    async fn test_repeat_lookup_is_served_from_cache() {
        // Arrange
        let server = MockServer::start().await;
        let json_body = include_str!("../../../fixtures/osu/user_7562902.json");

        Mock::given(method("GET"))
            .and(path("/api/v2/users/7562902"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(json_body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server, FixedWindowLimiter::default()).await;

        // Act: second call must not reach upstream (mock expect(1))
        let first = service.user_profile("1.2.3.4", 7_562_902).await.unwrap();
        let second = service.user_profile("1.2.3.4", 7_562_902).await.unwrap();

        // Assert
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_over_quota_caller_is_rejected() {
        // Arrange
        let server = MockServer::start().await;
        let json_body = include_str!("../../../fixtures/osu/user_7562902.json");

        Mock::given(method("GET"))
            .and(path("/api/v2/users/7562902"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(json_body, "application/json"))
            .mount(&server)
            .await;

        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(60));
        let service = service_for(&server, limiter).await;

        // Act
        service.user_profile("1.2.3.4", 7_562_902).await.unwrap();
        let rejected = service.user_profile("1.2.3.4", 7_562_902).await;
        let other_caller = service.user_profile("5.6.7.8", 7_562_902).await;

        // Assert: quota is per caller key
        assert!(matches!(rejected.unwrap_err(), ApiError::RateLimited));
        assert!(other_caller.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_call_never_reaches_upstream() {
        // Arrange: no GET mock mounted, only the limiter stands in the way
        let server = MockServer::start().await;
        let limiter = FixedWindowLimiter::new(0, Duration::from_secs(60));
        let service = service_for(&server, limiter).await;

        // Act
        let result = service.beatmap("1.2.3.4", 4_183_915).await;

        // Assert
        assert!(matches!(result.unwrap_err(), ApiError::RateLimited));
    }

    #[tokio::test]
    async fn test_beatmap_and_beatmapset_flow_through_caches() {
        // Arrange
        let server = MockServer::start().await;
        let beatmap_body = include_str!("../../../fixtures/osu/beatmap_4183915.json");
        let set_body = include_str!("../../../fixtures/osu/beatmapset_1986142.json");

        Mock::given(method("GET"))
            .and(path("/api/v2/beatmaps/4183915"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(beatmap_body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/beatmapsets/1986142"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(set_body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server, FixedWindowLimiter::default()).await;

        // Act
        let beatmap = service.beatmap("1.2.3.4", 4_183_915).await.unwrap();
        service.beatmap("1.2.3.4", 4_183_915).await.unwrap();
        let set = service.beatmapset("1.2.3.4", 1_986_142).await.unwrap();
        service.beatmapset("1.2.3.4", 1_986_142).await.unwrap();

        // Assert
        assert_eq!(beatmap.beatmapset_id, set.id);
        assert_eq!(set.beatmaps.len(), 2);
    }
}
