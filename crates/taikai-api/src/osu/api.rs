//! `OsuApi` trait definition.
#![allow(clippy::future_not_send)]

use crate::error::ApiError;

use super::types::{Beatmap, Beatmapset, UserProfile};

/// osu! API trait.
///
/// Abstracts the upstream lookups for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(OsuApi: Send)]
pub trait LocalOsuApi {
    /// Fetches and normalizes a user profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] when token acquisition fails,
    /// [`ApiError::Timeout`] when the request budget elapses, and
    /// [`ApiError::Http`] for non-success upstream responses.
    async fn fetch_user_profile(&self, user_id: u64) -> Result<UserProfile, ApiError>;

    /// Fetches and normalizes a beatmap.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`LocalOsuApi::fetch_user_profile`].
    async fn fetch_beatmap(&self, beatmap_id: u64) -> Result<Beatmap, ApiError>;

    /// Fetches and normalizes a beatmapset with its difficulty list.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`LocalOsuApi::fetch_user_profile`].
    async fn fetch_beatmapset(&self, beatmapset_id: u64) -> Result<Beatmapset, ApiError>;
}
