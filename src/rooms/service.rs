//! Room operations backed by the persistent store.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use rand::seq::IndexedRandom;
use tracing::info;

use crate::{
    dao::{
        models::{ArtistRefEntity, RoomEntity, StoredArtistEntity, UserId},
        room_store::RoomStore,
    },
    error::ServiceError,
    rooms::lifecycle::{self, Role},
};

/// Coordinates membership changes, challenge rolls and reclamation against a
/// [`RoomStore`]. Every mutation goes through the store's atomic update so
/// concurrent requests against the same room serialize.
#[derive(Clone)]
pub struct RoomService {
    store: Arc<dyn RoomStore>,
}

impl RoomService {
    /// Wrap a room store.
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Fetch a room snapshot.
    pub async fn get_room(&self, name: &str) -> Result<RoomEntity, ServiceError> {
        self.store
            .find_room(name.to_string())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("room `{name}`")))
    }

    /// Add `user` to the room and report the role they ended up with.
    ///
    /// Rooms must pre-exist; joining never creates one.
    pub async fn join_room(&self, name: &str, user: UserId) -> Result<Role, ServiceError> {
        let joining = user.clone();
        let outcome = self
            .store
            .update_room(
                name.to_string(),
                Box::new(move |room| lifecycle::apply_join(room, &joining)),
            )
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("room `{name}`")))?;

        Ok(lifecycle::role_of(&outcome.after, &user))
    }

    /// Remove `user` from the room. An emptied room snaps back to its
    /// canonical state in the same atomic update.
    ///
    /// Returns whether the user was actually a member.
    pub async fn leave_room(&self, name: &str, user: UserId) -> Result<bool, ServiceError> {
        let leaving = user.clone();
        let outcome = self
            .store
            .update_room(
                name.to_string(),
                Box::new(move |room| {
                    if lifecycle::apply_leave(room, &leaving).is_ok() && room.is_empty() {
                        lifecycle::reset(room, SystemTime::now());
                    }
                }),
            )
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("room `{name}`")))?;

        let removed =
            outcome.before.players.contains(&user) || outcome.before.spectators.contains(&user);

        if removed && outcome.after.is_empty() {
            info!(room = %name, "room emptied, reset to canonical state");
        }

        Ok(removed)
    }

    /// Roll a fresh challenge pair for the room from the stored artist pool.
    pub async fn set_new_room_artists(
        &self,
        name: &str,
    ) -> Result<(ArtistRefEntity, ArtistRefEntity), ServiceError> {
        let pool = self.store.list_artists().await?;
        let (initial, final_artist) = draw_distinct_pair(&pool).ok_or_else(|| {
            ServiceError::InvalidState("artist pool holds fewer than two artists".into())
        })?;

        let initial_ref = artist_ref(initial);
        let final_ref = artist_ref(final_artist);

        let (init_for_update, final_for_update) = (initial_ref.clone(), final_ref.clone());
        self.store
            .update_room(
                name.to_string(),
                Box::new(move |room| {
                    lifecycle::set_artists(
                        room,
                        init_for_update.clone(),
                        final_for_update.clone(),
                        SystemTime::now(),
                    );
                }),
            )
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("room `{name}`")))?;

        Ok((initial_ref, final_ref))
    }

    /// Reset every room idle past `threshold`, committing all resets in one
    /// batched write. Returns how many rooms were reclaimed.
    pub async fn reclaim_idle_rooms(
        &self,
        now: SystemTime,
        threshold: Duration,
    ) -> Result<usize, ServiceError> {
        let rooms = self.store.list_rooms().await?;

        let reclaimed: Vec<RoomEntity> = rooms
            .into_iter()
            .filter(|room| lifecycle::is_idle(room, now, threshold))
            .map(|mut room| {
                lifecycle::reset(&mut room, now);
                room
            })
            .collect();

        let count = reclaimed.len();
        if count > 0 {
            self.store.save_rooms(reclaimed).await?;
        }

        Ok(count)
    }
}

/// Pick two distinct artists from the pool, or `None` if it is too small.
fn draw_distinct_pair(
    pool: &[StoredArtistEntity],
) -> Option<(&StoredArtistEntity, &StoredArtistEntity)> {
    let mut rng = rand::rng();
    let mut picks = pool.choose_multiple(&mut rng, 2);
    let first = picks.next()?;
    let second = picks.next()?;
    Some((first, second))
}

fn artist_ref(artist: &StoredArtistEntity) -> ArtistRefEntity {
    ArtistRefEntity {
        id: Some(artist.id.clone()),
        name: Some(artist.name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::memory::MemoryRoomStore;
    use crate::rooms::lifecycle::MAX_PLAYERS_PER_ROOM;

    fn service_with_rooms(names: &[&str]) -> RoomService {
        RoomService::new(Arc::new(MemoryRoomStore::with_rooms(names)))
    }

    fn pool_artist(id: &str) -> StoredArtistEntity {
        StoredArtistEntity {
            id: id.to_string(),
            name: format!("Artist {id}"),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn join_unknown_room_is_not_found() {
        let service = service_with_rooms(&[]);
        let err = service.join_room("ghost", "alice".into()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_joins_never_exceed_capacity() {
        let service = service_with_rooms(&["lobby"]);

        let mut handles = Vec::new();
        for i in 0..20 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.join_room("lobby", format!("user-{i}")).await
            }));
        }

        let mut players = 0;
        let mut spectators = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                Role::Player => players += 1,
                Role::Spectator => spectators += 1,
            }
        }

        assert_eq!(players, MAX_PLAYERS_PER_ROOM);
        assert_eq!(spectators, 20 - MAX_PLAYERS_PER_ROOM);

        let room = service.get_room("lobby").await.unwrap();
        assert_eq!(room.players.len(), MAX_PLAYERS_PER_ROOM);
        assert_eq!(room.spectators.len(), 20 - MAX_PLAYERS_PER_ROOM);
    }

    #[tokio::test]
    async fn last_leave_resets_the_room() {
        let service = service_with_rooms(&["lobby"]);

        service.join_room("lobby", "alice".into()).await.unwrap();
        let removed = service.leave_room("lobby", "alice".into()).await.unwrap();
        assert!(removed);

        let room = service.get_room("lobby").await.unwrap();
        assert!(!room.active);
        assert!(room.is_empty());
        assert_eq!(room.initial_artist, ArtistRefEntity::empty());
    }

    #[tokio::test]
    async fn leave_by_non_member_reports_not_removed() {
        let service = service_with_rooms(&["lobby"]);
        service.join_room("lobby", "alice".into()).await.unwrap();

        let removed = service.leave_room("lobby", "bob".into()).await.unwrap();
        assert!(!removed);

        let room = service.get_room("lobby").await.unwrap();
        assert!(room.players.contains("alice"));
    }

    #[tokio::test]
    async fn new_artists_draws_a_distinct_pair_from_the_pool() {
        let store = Arc::new(MemoryRoomStore::with_rooms(&["lobby"]));
        store
            .replace_artists(vec![pool_artist("a1"), pool_artist("a2"), pool_artist("a3")])
            .await
            .unwrap();
        let service = RoomService::new(store);

        let (initial, final_artist) = service.set_new_room_artists("lobby").await.unwrap();
        assert_ne!(initial.id, final_artist.id);

        let room = service.get_room("lobby").await.unwrap();
        assert_eq!(room.initial_artist, initial);
        assert_eq!(room.final_artist, final_artist);
    }

    #[tokio::test]
    async fn new_artists_with_tiny_pool_is_invalid_state() {
        let store = Arc::new(MemoryRoomStore::with_rooms(&["lobby"]));
        store.replace_artists(vec![pool_artist("a1")]).await.unwrap();
        let service = RoomService::new(store);

        let err = service.set_new_room_artists("lobby").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn reclaim_resets_only_idle_rooms() {
        let store = Arc::new(MemoryRoomStore::with_rooms(&["stale", "busy"]));
        let service = RoomService::new(store.clone());

        service.join_room("stale", "alice".into()).await.unwrap();
        service.join_room("busy", "bob".into()).await.unwrap();

        let now = SystemTime::now();
        store
            .update_room(
                "stale".into(),
                Box::new(move |room| room.last_change = now - Duration::from_secs(600)),
            )
            .await
            .unwrap();

        let count = service
            .reclaim_idle_rooms(now, Duration::from_secs(180))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let stale = service.get_room("stale").await.unwrap();
        assert!(stale.is_empty());
        assert!(!stale.active);

        let busy = service.get_room("busy").await.unwrap();
        assert!(busy.players.contains("bob"));
    }
}
