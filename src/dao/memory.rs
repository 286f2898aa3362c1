//! In-memory [`RoomStore`] backend.
//!
//! Serves unit tests and storeless local runs. Room updates mutate the entry
//! in place under its map shard lock, which gives the same per-key atomicity
//! the CouchDB backend provides through revision conflicts.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, ready};

use crate::dao::{
    models::{DailyChallengeEntity, RoomEntity, StoredArtistEntity},
    room_store::{RoomMutation, RoomStore, RoomUpdateOutcome},
    storage::StorageResult,
};

#[derive(Default)]
struct Inner {
    rooms: DashMap<String, RoomEntity>,
    artists: Mutex<Vec<StoredArtistEntity>>,
    daily: Mutex<Option<DailyChallengeEntity>>,
}

/// Map-backed room repository.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    inner: Arc<Inner>,
}

impl MemoryRoomStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with fresh rooms under the given keys.
    pub fn with_rooms(names: &[&str]) -> Self {
        let store = Self::new();
        for name in names {
            store.inner.rooms.insert(name.to_string(), RoomEntity::fresh(*name));
        }
        store
    }
}

impl RoomStore for MemoryRoomStore {
    fn find_room(&self, name: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let room = self.inner.rooms.get(&name).map(|entry| entry.clone());
        ready(Ok(room)).boxed()
    }

    fn save_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.rooms.insert(room.name.clone(), room);
        ready(Ok(())).boxed()
    }

    fn update_room(
        &self,
        name: String,
        mut mutate: RoomMutation,
    ) -> BoxFuture<'static, StorageResult<Option<RoomUpdateOutcome>>> {
        // The entry guard holds the shard lock, so the read-mutate-write is
        // atomic with respect to concurrent updates of the same room.
        let outcome = self.inner.rooms.get_mut(&name).map(|mut entry| {
            let before = entry.clone();
            mutate(&mut entry);
            RoomUpdateOutcome {
                before,
                after: entry.clone(),
            }
        });
        ready(Ok(outcome)).boxed()
    }

    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let rooms = self
            .inner
            .rooms
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        ready(Ok(rooms)).boxed()
    }

    fn save_rooms(&self, rooms: Vec<RoomEntity>) -> BoxFuture<'static, StorageResult<()>> {
        for room in rooms {
            self.inner.rooms.insert(room.name.clone(), room);
        }
        ready(Ok(())).boxed()
    }

    fn list_artists(&self) -> BoxFuture<'static, StorageResult<Vec<StoredArtistEntity>>> {
        ready(Ok(self.inner.artists.lock().unwrap().clone())).boxed()
    }

    fn replace_artists(
        &self,
        artists: Vec<StoredArtistEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        *self.inner.artists.lock().unwrap() = artists;
        ready(Ok(())).boxed()
    }

    fn find_daily_challenge(
        &self,
    ) -> BoxFuture<'static, StorageResult<Option<DailyChallengeEntity>>> {
        ready(Ok(self.inner.daily.lock().unwrap().clone())).boxed()
    }

    fn save_daily_challenge(
        &self,
        challenge: DailyChallengeEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        *self.inner.daily.lock().unwrap() = Some(challenge);
        ready(Ok(())).boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(Ok(())).boxed()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(Ok(())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_room_reports_before_and_after_state() {
        let store = MemoryRoomStore::with_rooms(&["lobby"]);

        let outcome = store
            .update_room(
                "lobby".into(),
                Box::new(|room| {
                    room.players.insert("user-1".into());
                    room.active = true;
                }),
            )
            .await
            .unwrap()
            .expect("room exists");

        assert!(outcome.before.players.is_empty());
        assert!(outcome.after.players.contains("user-1"));
        assert!(outcome.after.active);

        let persisted = store.find_room("lobby".into()).await.unwrap().unwrap();
        assert_eq!(persisted, outcome.after);
    }

    #[tokio::test]
    async fn update_room_on_missing_key_is_a_no_op() {
        let store = MemoryRoomStore::new();
        let outcome = store
            .update_room("ghost".into(), Box::new(|_| {}))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
