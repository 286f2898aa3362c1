use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{DailyChallengeEntity, RoomEntity, StoredArtistEntity};

pub const ROOM_PREFIX: &str = "room::";
pub const ARTIST_POOL_DOC_ID: &str = "artists::pool";
pub const DAILY_CHALLENGE_DOC_ID: &str = "challenge::daily";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[allow(dead_code)]
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchRoomDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub room: RoomEntity,
}

impl CouchRoomDocument {
    pub fn from_entity(room: RoomEntity, rev: Option<String>) -> Self {
        Self {
            id: room_doc_id(&room.name),
            rev,
            room,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchArtistPoolDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub artists: Vec<StoredArtistEntity>,
}

impl CouchArtistPoolDocument {
    pub fn new(artists: Vec<StoredArtistEntity>, rev: Option<String>) -> Self {
        Self {
            id: ARTIST_POOL_DOC_ID.to_string(),
            rev,
            artists,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchDailyChallengeDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub challenge: DailyChallengeEntity,
}

impl CouchDailyChallengeDocument {
    pub fn new(challenge: DailyChallengeEntity, rev: Option<String>) -> Self {
        Self {
            id: DAILY_CHALLENGE_DOC_ID.to_string(),
            rev,
            challenge,
        }
    }
}

pub fn room_doc_id(name: &str) -> String {
    format!("{ROOM_PREFIX}{name}")
}
