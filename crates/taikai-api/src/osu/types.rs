//! osu! API v2 response types and their normalized projections.
//!
//! Raw types mirror the upstream wire shape with every field the upstream
//! may omit modelled as `Option`. Normalized types are the stable field set
//! the site depends on: every missing numeric statistic becomes `0` (never
//! null or NaN, so formatting code cannot confuse "missing" with "zero"),
//! and missing strings get documented fallbacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Avatar shown for users without one of their own.
pub const GUEST_AVATAR_URL: &str = "https://osu.ppy.sh/images/layout/avatar-guest.png";

// --- Users ---

/// Wire shape of `GET users/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    /// Display name. The upstream has been seen returning the literal
    /// string `"undefined"` here.
    pub username: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// ISO 3166-1 country code.
    pub country_code: Option<String>,
    /// Play statistics, absent for inactive accounts.
    pub statistics: Option<RawUserStatistics>,
    /// Profile comment.
    pub comment: Option<String>,
}

/// Wire shape of the `statistics` object on a user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUserStatistics {
    /// Performance points.
    pub pp: Option<f64>,
    /// Hit accuracy percentage.
    pub hit_accuracy: Option<f64>,
    /// Global ranking position.
    pub global_rank: Option<u64>,
    /// Country ranking position.
    pub country_rank: Option<u64>,
    /// Total play count.
    pub play_count: Option<u64>,
}

/// Normalized user profile served to the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// osu! user ID.
    pub id: u64,
    /// Display name, `"Player {id}"` when the upstream has none.
    pub username: String,
    /// Avatar URL, guest avatar when the upstream has none.
    pub avatar_url: String,
    /// ISO 3166-1 country code.
    pub country: String,
    /// Play statistics with missing values as 0.
    pub statistics: UserStatistics,
    /// Profile comment, empty when absent.
    pub comment: String,
}

/// Normalized play statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    /// Performance points.
    pub pp: f64,
    /// Hit accuracy percentage.
    pub accuracy: f64,
    /// Global ranking position.
    pub global_rank: u64,
    /// Country ranking position.
    pub country_rank: u64,
    /// Total play count.
    pub play_count: u64,
}

impl UserProfile {
    /// Projects a raw user response onto the normalized shape.
    #[must_use]
    pub fn from_raw(user_id: u64, raw: RawUser) -> Self {
        let username = match raw.username {
            Some(name) if !name.is_empty() && name != "undefined" => name,
            _ => format!("Player {user_id}"),
        };
        let stats = raw.statistics.unwrap_or_default();

        Self {
            id: user_id,
            username,
            avatar_url: raw
                .avatar_url
                .unwrap_or_else(|| String::from(GUEST_AVATAR_URL)),
            country: raw.country_code.unwrap_or_default(),
            statistics: UserStatistics {
                pp: stats.pp.unwrap_or(0.0),
                accuracy: stats.hit_accuracy.unwrap_or(0.0),
                global_rank: stats.global_rank.unwrap_or(0),
                country_rank: stats.country_rank.unwrap_or(0),
                play_count: stats.play_count.unwrap_or(0),
            },
            comment: raw.comment.unwrap_or_default(),
        }
    }
}

// --- Beatmaps ---

/// Wire shape of `GET beatmaps/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBeatmap {
    /// Beatmap ID.
    pub id: u64,
    /// Parent beatmapset ID.
    pub beatmapset_id: u64,
    /// Difficulty name.
    pub version: String,
    /// Length in seconds.
    pub total_length: Option<u32>,
    /// Star rating.
    pub difficulty_rating: Option<f64>,
    /// Beats per minute.
    pub bpm: Option<f64>,
    /// Circle size.
    pub cs: Option<f64>,
    /// Approach rate.
    pub ar: Option<f64>,
    /// Overall difficulty.
    pub accuracy: Option<f64>,
    /// HP drain.
    pub drain: Option<f64>,
    /// Song artist, usually only present on the nested beatmapset.
    pub artist: Option<String>,
    /// Song title, usually only present on the nested beatmapset.
    pub title: Option<String>,
    /// Mapper name, usually only present on the nested beatmapset.
    pub creator: Option<String>,
    /// Nested beatmapset header.
    pub beatmapset: Option<RawBeatmapsetHeader>,
}

/// Artist/title/creator header nested inside a beatmap response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBeatmapsetHeader {
    /// Song artist.
    pub artist: Option<String>,
    /// Song title.
    pub title: Option<String>,
    /// Mapper name.
    pub creator: Option<String>,
}

/// Normalized beatmap metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beatmap {
    /// Beatmap ID.
    pub id: u64,
    /// Parent beatmapset ID.
    pub beatmapset_id: u64,
    /// Difficulty name.
    pub version: String,
    /// Length in seconds.
    pub total_length: u32,
    /// Star rating.
    pub difficulty_rating: f64,
    /// Beats per minute.
    pub bpm: f64,
    /// Circle size.
    pub cs: f64,
    /// Approach rate.
    pub ar: f64,
    /// Overall difficulty.
    pub accuracy: f64,
    /// HP drain.
    pub drain: f64,
    /// Song artist.
    pub artist: String,
    /// Song title.
    pub title: String,
    /// Mapper name.
    pub creator: String,
    /// Song header echoed in the nested shape older pages read.
    pub beatmapset: BeatmapsetHeader,
}

/// Normalized artist/title/creator header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatmapsetHeader {
    /// Song artist.
    pub artist: String,
    /// Song title.
    pub title: String,
    /// Mapper name.
    pub creator: String,
}

impl Beatmap {
    /// Projects a raw beatmap response onto the normalized shape.
    ///
    /// Artist, title, and creator prefer the nested beatmapset object and
    /// fall back to the top-level fields, matching how the upstream
    /// populates them.
    #[must_use]
    pub fn from_raw(raw: RawBeatmap) -> Self {
        let nested = raw.beatmapset.unwrap_or_default();
        let artist = nested.artist.or(raw.artist).unwrap_or_default();
        let title = nested.title.or(raw.title).unwrap_or_default();
        let creator = nested.creator.or(raw.creator).unwrap_or_default();

        Self {
            id: raw.id,
            beatmapset_id: raw.beatmapset_id,
            version: raw.version,
            total_length: raw.total_length.unwrap_or(0),
            difficulty_rating: raw.difficulty_rating.unwrap_or(0.0),
            bpm: raw.bpm.unwrap_or(0.0),
            cs: raw.cs.unwrap_or(0.0),
            ar: raw.ar.unwrap_or(0.0),
            accuracy: raw.accuracy.unwrap_or(0.0),
            drain: raw.drain.unwrap_or(0.0),
            artist: artist.clone(),
            title: title.clone(),
            creator: creator.clone(),
            beatmapset: BeatmapsetHeader {
                artist,
                title,
                creator,
            },
        }
    }
}

// --- Beatmapsets ---

/// Wire shape of `GET beatmapsets/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBeatmapset {
    /// Beatmapset ID.
    pub id: u64,
    /// Song artist.
    pub artist: Option<String>,
    /// Song title.
    pub title: Option<String>,
    /// Mapper name.
    pub creator: Option<String>,
    /// Cover image URLs by size name.
    #[serde(default)]
    pub covers: BTreeMap<String, String>,
    /// Ranked status.
    pub status: Option<String>,
    /// Difficulties in the set.
    #[serde(default)]
    pub beatmaps: Vec<RawBeatmapsetEntry>,
}

/// A difficulty entry inside a beatmapset response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBeatmapsetEntry {
    /// Beatmap ID.
    pub id: u64,
    /// Difficulty name.
    pub version: String,
    /// Star rating.
    pub difficulty_rating: Option<f64>,
    /// Game mode.
    pub mode: Option<String>,
    /// Ranked status.
    pub status: Option<String>,
}

/// Normalized beatmapset metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beatmapset {
    /// Beatmapset ID.
    pub id: u64,
    /// Song artist.
    pub artist: String,
    /// Song title.
    pub title: String,
    /// Mapper name.
    pub creator: String,
    /// Cover image URLs by size name.
    pub covers: BTreeMap<String, String>,
    /// Ranked status.
    pub status: String,
    /// Difficulties in the set.
    pub beatmaps: Vec<BeatmapsetEntry>,
}

/// Normalized difficulty entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatmapsetEntry {
    /// Beatmap ID.
    pub id: u64,
    /// Difficulty name.
    pub version: String,
    /// Star rating.
    pub difficulty_rating: f64,
    /// Game mode.
    pub mode: String,
    /// Ranked status.
    pub status: String,
}

impl Beatmapset {
    /// Projects a raw beatmapset response onto the normalized shape.
    #[must_use]
    pub fn from_raw(raw: RawBeatmapset) -> Self {
        Self {
            id: raw.id,
            artist: raw.artist.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            creator: raw.creator.unwrap_or_default(),
            covers: raw.covers,
            status: raw.status.unwrap_or_default(),
            beatmaps: raw
                .beatmaps
                .into_iter()
                .map(|b| BeatmapsetEntry {
                    id: b.id,
                    version: b.version,
                    difficulty_rating: b.difficulty_rating.unwrap_or(0.0),
                    mode: b.mode.unwrap_or_default(),
                    status: b.status.unwrap_or_default(),
                })
                .collect(),
        }
    }
}
