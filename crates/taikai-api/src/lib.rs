//! osu! API v2 access layer for taikai.
//!
//! Provides the bearer-token cache, per-caller rate limiting, the upstream
//! HTTP client with response normalization, and the in-process response
//! cache used by the tournament site's API routes.

/// Response caching (in-process TTL cache, Cache-Control helpers).
pub mod cache;

/// Typed error taxonomy for the access layer.
pub mod error;

/// osu! API v2 client.
pub mod osu;

/// Per-caller fixed-window rate limiting.
pub mod rate_limit;

/// Process-scoped service composing limiter, cache, and client.
pub mod service;

pub use error::ApiError;
