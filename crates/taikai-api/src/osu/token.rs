//! OAuth client-credentials token acquisition and caching.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use crate::error::ApiError;

/// Default token endpoint for the osu! API.
pub const DEFAULT_TOKEN_URL: &str = "https://osu.ppy.sh/oauth/token";

/// OAuth client credentials for the upstream API.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

impl Credentials {
    /// Creates credentials from explicit values.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Reads credentials from `CLIENT_ID` / `CLIENT_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] when either variable is unset, so a
    /// malformed token request is never sent.
    pub fn from_env() -> Result<Self, ApiError> {
        let client_id = std::env::var("CLIENT_ID")
            .map_err(|_| ApiError::Auth(String::from("CLIENT_ID is not set")))?;
        let client_secret = std::env::var("CLIENT_SECRET")
            .map_err(|_| ApiError::Auth(String::from("CLIENT_SECRET is not set")))?;
        Ok(Self::new(client_id, client_secret))
    }
}

/// A bearer token with its expiry instant.
///
/// Replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone)]
struct BearerToken {
    value: String,
    expires_at: Instant,
}

/// Wire shape of the token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
}

/// Caches one client-credentials bearer token per process.
///
/// While the cached token is unexpired, `token()` returns it without any
/// network traffic. The refresh runs under the cache mutex, so concurrent
/// callers that race an expiry trigger a single refresh.
#[derive(Debug)]
pub struct TokenManager {
    http_client: Client,
    token_url: Url,
    credentials: Credentials,
    request_timeout: Duration,
    cached: Mutex<Option<BearerToken>>,
}

impl TokenManager {
    /// Creates a manager with an empty cache.
    pub(crate) fn new(
        http_client: Client,
        token_url: Url,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            token_url,
            credentials,
            request_timeout,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token value, refreshing if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] when the token endpoint rejects the
    /// request, times out, or answers without an `access_token`.
    #[instrument(skip_all)]
    pub async fn token(&self) -> Result<String, ApiError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref()
            && Instant::now() < token.expires_at
        {
            return Ok(token.value.clone());
        }

        tracing::debug!("requesting new access token");
        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Performs the client-credentials token request.
    async fn request_token(&self) -> Result<BearerToken, ApiError> {
        let body = serde_json::json!({
            "client_id": self.credentials.client_id,
            "client_secret": self.credentials.client_secret,
            "grant_type": "client_credentials",
            "scope": "public",
        });

        let send = async {
            let response = self
                .http_client
                .post(self.token_url.clone())
                .json(&body)
                .send()
                .await
                .map_err(|e| ApiError::Auth(format!("token request failed: {e}")))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| ApiError::Auth(format!("token response unreadable: {e}")))?;
            Ok::<_, ApiError>((status, text))
        };

        let (status, text) = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| ApiError::Auth(String::from("token request timed out")))??;

        if !status.is_success() {
            tracing::warn!(%status, "token endpoint rejected the request");
            return Err(ApiError::Auth(format!(
                "token endpoint returned HTTP {status}: {text}"
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::Auth(format!("token response decoding failed: {e}")))?;

        let value = match parsed.access_token {
            Some(v) if !v.is_empty() => v,
            _ => return Err(ApiError::Auth(String::from("no access token received"))),
        };

        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(parsed.expires_in))
            .ok_or_else(|| ApiError::Auth(String::from("token expiry out of range")))?;

        Ok(BearerToken { value, expires_at })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn manager_for(server: &MockServer, timeout: Duration) -> TokenManager {
        let token_url = format!("{}/oauth/token", server.uri());
        TokenManager::new(
            Client::new(),
            token_url.parse().unwrap(),
            Credentials::new("1234", "s3cret"),
            timeout,
        )
    }

    #[tokio::test]
    async fn test_token_is_cached_within_validity() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"token_type":"Bearer","expires_in":86400,"access_token":"tok-1"}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;
        let manager = manager_for(&server, TIMEOUT);

        // Act: two calls inside the validity window
        let first = manager.token().await.unwrap();
        let second = manager.token().await.unwrap();

        // Assert: one network call (mock expect(1)), same token
        assert_eq!(first, "tok-1");
        assert_eq!(second, "tok-1");
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        // Arrange: expires_in of 0 makes every token immediately stale
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"token_type":"Bearer","expires_in":0,"access_token":"tok-short"}"#,
                "application/json",
            ))
            .expect(2)
            .mount(&server)
            .await;
        let manager = manager_for(&server, TIMEOUT);

        // Act & Assert: both calls reach the endpoint (mock expect(2))
        manager.token().await.unwrap();
        manager.token().await.unwrap();
    }

    #[tokio::test]
    async fn test_client_credentials_grant_is_sent() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_partial_json(serde_json::json!({
                "client_id": "1234",
                "grant_type": "client_credentials",
                "scope": "public",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"token_type":"Bearer","expires_in":86400,"access_token":"tok-1"}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;
        let manager = manager_for(&server, TIMEOUT);

        // Act & Assert (mock matchers verify the grant body)
        manager.token().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_access_token_is_an_auth_error() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"token_type":"Bearer","expires_in":86400}"#,
                "application/json",
            ))
            .mount(&server)
            .await;
        let manager = manager_for(&server, TIMEOUT);

        // Act
        let result = manager.token().await;

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
        assert!(err.to_string().contains("no access token received"));
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_an_auth_error() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_raw(r#"{"error":"invalid_client"}"#, "application/json"),
            )
            .mount(&server)
            .await;
        let manager = manager_for(&server, TIMEOUT);

        // Act
        let result = manager.token().await;

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_slow_token_endpoint_is_an_auth_error() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        r#"{"token_type":"Bearer","expires_in":86400,"access_token":"tok-1"}"#,
                        "application/json",
                    )
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        let manager = manager_for(&server, Duration::from_millis(50));

        // Act
        let result = manager.token().await;

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
        assert!(err.to_string().contains("timed out"));
    }
}
