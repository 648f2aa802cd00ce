//! osu! API v2 client module.
//!
//! Handles the client-credentials token flow and the `users`, `beatmaps`,
//! and `beatmapsets` lookups, normalizing each response into the stable
//! shapes the site renders.

mod api;
mod client;
mod token;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalOsuApi, OsuApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, OsuClient, OsuClientBuilder};
pub use token::{Credentials, DEFAULT_TOKEN_URL, TokenManager};
pub use types::{
    Beatmap, Beatmapset, BeatmapsetEntry, BeatmapsetHeader, GUEST_AVATAR_URL, RawBeatmap,
    RawBeatmapset, RawBeatmapsetEntry, RawBeatmapsetHeader, RawUser, RawUserStatistics,
    UserProfile, UserStatistics,
};
