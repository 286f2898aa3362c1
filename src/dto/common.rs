//! Response shapes shared by several routes.

use serde::Serialize;

use crate::catalog::models::{Artist, Track};

/// Artist as exposed over the API.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistSummary {
    /// Catalog artist id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar URL when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl From<Artist> for ArtistSummary {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            photo_url: artist.photo_url,
        }
    }
}

/// Track as exposed over the API.
#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    /// Catalog track id.
    pub id: String,
    /// Canonical title.
    pub name: String,
    /// Credited artists, catalog order.
    pub artists: Vec<ArtistSummary>,
}

impl From<Track> for TrackSummary {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            name: track.name,
            artists: track.artists.into_iter().map(Into::into).collect(),
        }
    }
}
