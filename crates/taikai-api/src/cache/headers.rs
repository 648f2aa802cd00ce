//! Cache lifetimes, version tags, and `Cache-Control` directive construction.
//!
//! Durations differ by volatility: beatmap and beatmapset metadata rarely
//! changes after ranking, user statistics move with every play session.

use std::time::Duration;

/// Default TTL for cached upstream responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(180);

/// TTL for beatmap and beatmapset metadata.
pub const BEATMAP_TTL: Duration = Duration::from_secs(600);

/// TTL for user profiles and statistics.
pub const USER_TTL: Duration = Duration::from_secs(60);

/// Version tag for cached beatmap data. Bump to invalidate persisted copies.
pub const BEATMAP_CACHE_VERSION: &str = "1.0.0";

/// Version tag for cached player data. Bump to invalidate persisted copies.
pub const PLAYER_CACHE_VERSION: &str = "1.0.0";

/// Builds the `Cache-Control` header value for a cached API response.
///
/// `s-maxage` lets CDNs serve the response without invoking the handler;
/// `stale-while-revalidate` keeps them serving while they refresh.
#[must_use]
pub fn cache_control(duration: Duration) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate",
        duration.as_secs()
    )
}
