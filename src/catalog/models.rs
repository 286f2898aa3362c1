//! Domain models for catalog entities.

use serde::{Deserialize, Serialize};

/// An artist as known to the catalog. Immutable once fetched; `photo_url` is
/// attached after a secondary artist lookup, the track endpoints do not
/// return it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Catalog-assigned unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL of the artist's smallest profile image, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// A recording. `artists` keeps the catalog order, primary artist first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog-assigned unique identifier.
    pub id: String,
    /// Canonical track title.
    pub name: String,
    /// Every artist credited on the recording.
    pub artists: Vec<Artist>,
}

impl Track {
    /// Whether the given artist is credited on this track.
    pub fn credits_artist(&self, artist_id: &str) -> bool {
        self.artists.iter().any(|artist| artist.id == artist_id)
    }
}

/// Release category reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumType {
    /// Full-length release.
    Album,
    /// Single or EP.
    Single,
    /// Compilation release.
    Compilation,
    /// Release the artist appears on without owning it.
    AppearsOn,
}

/// An album, used only as an intermediate key to reach tracks. The embedded
/// track list is empty on album-list results and populated on full records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Catalog-assigned unique identifier.
    pub id: String,
    /// Release title.
    pub name: String,
    /// Release category.
    pub album_type: AlbumType,
    /// Number of tracks the catalog reports for the release.
    pub total_tracks: u32,
    /// Artists credited on the release itself.
    pub artists: Vec<Artist>,
    /// Tracks on the release, when the full record was fetched.
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// One page of a paginated catalog result set.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages.
    pub total: usize,
    /// Items on this page.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Map the page items while keeping the reported total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
