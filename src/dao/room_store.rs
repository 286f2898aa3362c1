use futures::future::BoxFuture;

use crate::dao::{
    models::{DailyChallengeEntity, RoomEntity, StoredArtistEntity},
    storage::StorageResult,
};

/// Mutation applied atomically to a room document by [`RoomStore::update_room`].
///
/// `FnMut` because optimistic backends may re-read and re-apply it when the
/// write loses a compare-and-swap race.
pub type RoomMutation = Box<dyn FnMut(&mut RoomEntity) + Send>;

/// Room state before and after an atomic update.
#[derive(Debug, Clone)]
pub struct RoomUpdateOutcome {
    /// Document as read before the mutation.
    pub before: RoomEntity,
    /// Document as committed.
    pub after: RoomEntity,
}

/// Abstraction over the persistence layer for rooms, the stored artist pool
/// and the daily challenge slot.
///
/// `update_room` is the only way to mutate a room: backends must apply the
/// mutation atomically with respect to other updates of the same key, so
/// concurrent joins linearize instead of overwriting each other.
pub trait RoomStore: Send + Sync {
    /// Fetch a room by key.
    fn find_room(&self, name: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Create or replace a room document.
    fn save_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Atomically mutate a room, returning its before/after state, or `None`
    /// when no room exists under the key.
    fn update_room(
        &self,
        name: String,
        mutate: RoomMutation,
    ) -> BoxFuture<'static, StorageResult<Option<RoomUpdateOutcome>>>;
    /// Every room document.
    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>>;
    /// Replace many room documents in one batched commit (reclaim sweep).
    fn save_rooms(&self, rooms: Vec<RoomEntity>) -> BoxFuture<'static, StorageResult<()>>;
    /// The stored artist pool.
    fn list_artists(&self) -> BoxFuture<'static, StorageResult<Vec<StoredArtistEntity>>>;
    /// Replace the stored artist pool.
    fn replace_artists(
        &self,
        artists: Vec<StoredArtistEntity>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// The current daily challenge, if one was picked.
    fn find_daily_challenge(&self)
    -> BoxFuture<'static, StorageResult<Option<DailyChallengeEntity>>>;
    /// Overwrite the daily challenge slot.
    fn save_daily_challenge(
        &self,
        challenge: DailyChallengeEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap connectivity probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a lost connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
