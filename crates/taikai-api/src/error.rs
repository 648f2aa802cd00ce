//! Error taxonomy for the osu! access layer.
//!
//! Every failure path in this crate surfaces as one of these variants so
//! that route handlers can map errors to HTTP statuses without string
//! matching. Nothing in the call path collapses to a generic error.

use std::time::Duration;

/// Errors produced by the access layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Credentials are missing or the token endpoint rejected the request.
    #[error("upstream auth failed: {0}")]
    Auth(String),

    /// The upstream call did not complete within the request budget.
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream responded with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Http {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body, as received.
        body: String,
    },

    /// The request could not be performed at all, or its body could not
    /// be decoded. Covers transport failures and malformed JSON.
    #[error("upstream request failed: {0}")]
    Request(String),

    /// The caller exceeded its request quota.
    #[error("rate limit exceeded, try again later")]
    RateLimited,
}

impl ApiError {
    /// HTTP status a route handler should respond with for this error.
    ///
    /// Upstream HTTP errors forward the upstream's own status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Auth(_) => 401,
            Self::Timeout(_) => 504,
            Self::Http { status, .. } => *status,
            Self::Request(_) => 500,
            Self::RateLimited => 429,
        }
    }
}
