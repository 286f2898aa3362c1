//! Entities persisted in the room repository.

use std::time::SystemTime;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Opaque identifier issued by the identity layer (out of scope here).
pub type UserId = String;

/// Reference to a catalog artist stored on a room. Cleared rooms keep a
/// null-id placeholder rather than dropping the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRefEntity {
    /// Catalog artist id, absent on freshly reset rooms.
    pub id: Option<String>,
    /// Artist display name, absent on freshly reset rooms.
    pub name: Option<String>,
}

impl ArtistRefEntity {
    /// The placeholder written by a room reset.
    pub fn empty() -> Self {
        Self { id: None, name: None }
    }
}

/// Room access category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// Open room for anonymous guests (the reset default).
    #[default]
    Guest,
    /// Room owned by a registered user.
    User,
    /// Competition room.
    Competition,
}

/// A shared session document coordinating players around one artist-pair
/// challenge. Keyed by `name`; must pre-exist before anyone can join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEntity {
    /// Room key.
    pub name: String,
    /// Whether a game is in progress.
    pub active: bool,
    /// Members playing, in join order. Capped by the room capacity.
    pub players: IndexSet<UserId>,
    /// Members watching, in join order.
    pub spectators: IndexSet<UserId>,
    /// Seed artist of the current challenge.
    pub initial_artist: ArtistRefEntity,
    /// Target artist of the current challenge.
    pub final_artist: ArtistRefEntity,
    /// Access category.
    pub kind: RoomKind,
    /// Owning user for `user`/`competition` rooms.
    pub owner: Option<UserId>,
    /// Whether title matching runs in strict mode for this room.
    pub hard_mode: bool,
    /// Stamped when the challenge artists change or the room resets; the
    /// idle-reclamation sweep measures elapsed time against this.
    pub last_change: SystemTime,
}

impl RoomEntity {
    /// A room in its canonical inactive state.
    pub fn fresh(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: false,
            players: IndexSet::new(),
            spectators: IndexSet::new(),
            initial_artist: ArtistRefEntity::empty(),
            final_artist: ArtistRefEntity::empty(),
            kind: RoomKind::Guest,
            owner: None,
            hard_mode: false,
            last_change: SystemTime::now(),
        }
    }

    /// Whether the room has neither players nor spectators.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.spectators.is_empty()
    }
}

/// Artist kept in the stored pool that seeds new challenges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArtistEntity {
    /// Catalog artist id.
    pub id: String,
    /// Artist display name.
    pub name: String,
    /// Avatar URL when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// The single daily challenge slot. Overwritten every day; no history kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallengeEntity {
    /// Calendar date the pair was drawn for, `YYYY-MM-DD`.
    pub date: String,
    /// Seed artist.
    pub initial_artist: StoredArtistEntity,
    /// Target artist.
    pub final_artist: StoredArtistEntity,
}
