//! Request and response bodies for room routes.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    dao::models::{ArtistRefEntity, RoomEntity, RoomKind},
    dto::validation::validate_opaque_id,
    rooms::Role,
};

/// Body of `POST /rooms/{name}/join`.
#[derive(Debug, Deserialize, Validate)]
pub struct JoinRoomRequest {
    /// Joining user.
    #[validate(custom(function = "validate_opaque_id"))]
    pub user_id: String,
}

/// Result of a join.
#[derive(Debug, Serialize)]
pub struct JoinRoomResponse {
    /// Role the user ended up with.
    pub role: Role,
}

/// Body of `POST /rooms/{name}/leave`.
#[derive(Debug, Deserialize, Validate)]
pub struct LeaveRoomRequest {
    /// Leaving user.
    #[validate(custom(function = "validate_opaque_id"))]
    pub user_id: String,
}

/// Result of a leave.
#[derive(Debug, Serialize)]
pub struct LeaveRoomResponse {
    /// Whether the user was actually a member of the room.
    pub removed: bool,
}

/// Artist reference carried on a room snapshot.
#[derive(Debug, Serialize)]
pub struct ArtistRef {
    /// Catalog artist id, absent on reset rooms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name, absent on reset rooms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<ArtistRefEntity> for ArtistRef {
    fn from(entity: ArtistRefEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

/// Full room state as returned by `GET /rooms/{name}`.
#[derive(Debug, Serialize)]
pub struct RoomSnapshot {
    /// Room key.
    pub name: String,
    /// Whether a game is in progress.
    pub active: bool,
    /// Players in join order.
    pub players: Vec<String>,
    /// Spectators in join order.
    pub spectators: Vec<String>,
    /// Seed artist of the current challenge.
    pub initial_artist: ArtistRef,
    /// Target artist of the current challenge.
    pub final_artist: ArtistRef,
    /// Access category.
    pub kind: RoomKind,
    /// Owning user, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Whether title matching runs strict for this room.
    pub hard_mode: bool,
    /// RFC 3339 timestamp of the last challenge change.
    pub last_change: String,
}

impl From<RoomEntity> for RoomSnapshot {
    fn from(room: RoomEntity) -> Self {
        Self {
            name: room.name,
            active: room.active,
            players: room.players.into_iter().collect(),
            spectators: room.spectators.into_iter().collect(),
            initial_artist: room.initial_artist.into(),
            final_artist: room.final_artist.into(),
            kind: room.kind,
            owner: room.owner,
            hard_mode: room.hard_mode,
            last_change: super::format_system_time(room.last_change),
        }
    }
}

/// Result of rolling new challenge artists for a room.
#[derive(Debug, Serialize)]
pub struct NewArtistsResponse {
    /// New seed artist.
    pub initial_artist: ArtistRef,
    /// New target artist.
    pub final_artist: ArtistRef,
}
