//! Request and response bodies for game routes.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    dao::models::{DailyChallengeEntity, StoredArtistEntity},
    dto::{
        common::{ArtistSummary, TrackSummary},
        validation::validate_opaque_id,
    },
};

/// Body of `POST /game/check`.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckSongRequest {
    /// Guessed track title.
    #[validate(length(min = 1, max = 200))]
    pub guess: String,
    /// First artist of the pair.
    #[validate(custom(function = "validate_opaque_id"))]
    pub artist_a: String,
    /// Second artist of the pair.
    #[validate(custom(function = "validate_opaque_id"))]
    pub artist_b: String,
    /// Whether the title must match exactly (modulo case and diacritics).
    #[serde(default)]
    pub hard_mode: bool,
}

/// Verdict of a song check.
#[derive(Debug, Serialize)]
pub struct CheckSongResponse {
    /// Whether the guess named a shared recording.
    pub found: bool,
    /// The matching track, on a hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackSummary>,
    /// Credited artists with photos, on a hit.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<ArtistSummary>,
}

/// Body of `POST /game/discography/search`.
#[derive(Debug, Deserialize, Validate)]
pub struct DiscographySearchRequest {
    /// Artist whose discography is searched.
    #[validate(custom(function = "validate_opaque_id"))]
    pub artist_id: String,
    /// Optional title filter.
    #[validate(length(min = 1, max = 200))]
    pub track_name: Option<String>,
    /// Keep only multi-artist recordings.
    #[serde(default)]
    pub only_collaborations: bool,
    /// Keep only recordings crediting the searched artist. On by default;
    /// turn off to include tracks an artist's "appears on" albums carry
    /// without crediting them.
    #[serde(default = "default_true")]
    pub require_this_artist: bool,
    /// Title matching mode for `track_name`.
    #[serde(default)]
    pub strict_mode: bool,
}

fn default_true() -> bool {
    true
}

/// Body of `POST /game/features`.
#[derive(Debug, Deserialize, Validate)]
pub struct FeaturesRequest {
    /// First artist of the pair.
    #[validate(custom(function = "validate_opaque_id"))]
    pub artist_a: String,
    /// Second artist of the pair.
    #[validate(custom(function = "validate_opaque_id"))]
    pub artist_b: String,
}

/// A list of tracks.
#[derive(Debug, Serialize)]
pub struct TrackListResponse {
    /// Matching tracks.
    pub tracks: Vec<TrackSummary>,
}

/// Stored artist as exposed by challenge routes.
#[derive(Debug, Serialize)]
pub struct StoredArtist {
    /// Catalog artist id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar URL when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl From<StoredArtistEntity> for StoredArtist {
    fn from(entity: StoredArtistEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            photo_url: entity.photo_url,
        }
    }
}

/// Body of `GET /game/daily`.
#[derive(Debug, Serialize)]
pub struct DailyChallengeResponse {
    /// Date the pair was drawn for, `YYYY-MM-DD`.
    pub date: String,
    /// Seed artist.
    pub initial_artist: StoredArtist,
    /// Target artist.
    pub final_artist: StoredArtist,
}

impl From<DailyChallengeEntity> for DailyChallengeResponse {
    fn from(entity: DailyChallengeEntity) -> Self {
        Self {
            date: entity.date,
            initial_artist: entity.initial_artist.into(),
            final_artist: entity.final_artist.into(),
        }
    }
}

/// Body of `POST /game/starting-artists`.
#[derive(Debug, Deserialize, Validate)]
pub struct StartingArtistsRequest {
    /// How many artists to draw. Defaults to a challenge pair.
    #[serde(default = "default_starting_count")]
    #[validate(range(min = 1, max = 10))]
    pub count: usize,
    /// Preferred genre seed, when any.
    #[validate(length(min = 1, max = 50))]
    pub genre: Option<String>,
}

fn default_starting_count() -> usize {
    2
}

/// Result of a starting-artists draw.
#[derive(Debug, Serialize)]
pub struct StartingArtistsResponse {
    /// Drawn artists with photos.
    pub artists: Vec<ArtistSummary>,
    /// Genre the draw actually used.
    pub genre: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discography_search_requires_the_artist_by_default() {
        let request: DiscographySearchRequest =
            serde_json::from_str(r#"{"artist_id": "a1"}"#).unwrap();
        assert!(request.require_this_artist);
        assert!(!request.only_collaborations);
        assert!(!request.strict_mode);
    }

    #[test]
    fn discography_search_honors_an_explicit_opt_out() {
        let request: DiscographySearchRequest =
            serde_json::from_str(r#"{"artist_id": "a1", "require_this_artist": false}"#).unwrap();
        assert!(!request.require_this_artist);
    }

    #[test]
    fn starting_artists_count_defaults_to_a_pair() {
        let request: StartingArtistsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.count, 2);
        assert!(request.genre.is_none());
    }
}
