//! Pure membership and reset rules applied to room entities.
//!
//! All functions here mutate an in-memory [`RoomEntity`] and are meant to run
//! inside an atomic store update, so concurrent callers observe a consistent
//! roster.

use std::time::{Duration, SystemTime};

use serde::Serialize;
use thiserror::Error;

use crate::dao::models::{ArtistRefEntity, RoomEntity, RoomKind, UserId};

/// Hard cap on simultaneous players in one room. Everyone past it watches.
pub const MAX_PLAYERS_PER_ROOM: usize = 6;

/// Capacity granted to a member joining a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Member occupies a player seat.
    Player,
    /// Member watches; promoted when a seat frees up.
    Spectator,
}

/// Raised when a leave targets a user who is not in the room.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("user is not a member of room `{room}`")]
pub struct NotAMember {
    /// Room the leave was addressed to.
    pub room: String,
}

/// Admit `user` to the room, or promote them if they already spectate and a
/// seat is free. Joining is idempotent for existing players.
pub fn apply_join(room: &mut RoomEntity, user: &UserId) {
    if room.players.contains(user) {
        return;
    }

    let seat_free = room.players.len() < MAX_PLAYERS_PER_ROOM;

    if room.spectators.contains(user) {
        if seat_free {
            room.spectators.shift_remove(user);
            room.players.insert(user.clone());
            room.active = true;
        }
        return;
    }

    if seat_free {
        room.players.insert(user.clone());
        room.active = true;
    } else {
        room.spectators.insert(user.clone());
    }
}

/// The role `user` holds after a join has been applied.
pub fn role_of(room: &RoomEntity, user: &UserId) -> Role {
    if room.players.contains(user) {
        Role::Player
    } else {
        Role::Spectator
    }
}

/// Remove `user` from whichever roster holds them.
pub fn apply_leave(room: &mut RoomEntity, user: &UserId) -> Result<(), NotAMember> {
    if room.players.shift_remove(user) || room.spectators.shift_remove(user) {
        Ok(())
    } else {
        Err(NotAMember {
            room: room.name.clone(),
        })
    }
}

/// Return the room to its canonical inactive state and stamp the change.
pub fn reset(room: &mut RoomEntity, now: SystemTime) {
    room.active = false;
    room.players.clear();
    room.spectators.clear();
    room.initial_artist = ArtistRefEntity::empty();
    room.final_artist = ArtistRefEntity::empty();
    room.kind = RoomKind::Guest;
    room.owner = None;
    room.hard_mode = false;
    room.last_change = now;
}

/// Install a new challenge pair. `last_change` is stamped only when one of the
/// artist ids actually moves, so re-submitting the same pair does not shield a
/// room from reclamation.
pub fn set_artists(
    room: &mut RoomEntity,
    initial: ArtistRefEntity,
    final_artist: ArtistRefEntity,
    now: SystemTime,
) {
    let changed = room.initial_artist.id != initial.id || room.final_artist.id != final_artist.id;
    room.initial_artist = initial;
    room.final_artist = final_artist;
    if changed {
        room.last_change = now;
    }
}

/// Whether the room has sat on the same challenge long enough to reclaim.
/// Inactive empty rooms are already canonical and never count as idle.
pub fn is_idle(room: &RoomEntity, now: SystemTime, threshold: Duration) -> bool {
    if !room.active && room.is_empty() {
        return false;
    }
    // A clock that went backwards yields an elapsed time of zero.
    let elapsed = now
        .duration_since(room.last_change)
        .unwrap_or(Duration::ZERO);
    elapsed >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomEntity {
        RoomEntity::fresh("lobby")
    }

    fn join(room: &mut RoomEntity, user: &str) -> Role {
        let user = user.to_string();
        apply_join(room, &user);
        role_of(room, &user)
    }

    #[test]
    fn first_join_activates_the_room() {
        let mut room = room();
        assert!(!room.active);

        let role = join(&mut room, "alice");

        assert_eq!(role, Role::Player);
        assert!(room.active);
        assert_eq!(room.players.len(), 1);
    }

    #[test]
    fn joins_fill_seats_in_order_then_overflow_to_spectators() {
        let mut room = room();
        let users: Vec<String> = (0..8).map(|i| format!("user-{i}")).collect();

        for user in &users {
            apply_join(&mut room, user);
        }

        let players: Vec<&String> = room.players.iter().collect();
        assert_eq!(players, users[..MAX_PLAYERS_PER_ROOM].iter().collect::<Vec<_>>());
        assert_eq!(room.spectators.len(), 2);
        assert!(room.spectators.contains("user-6"));
        assert!(room.spectators.contains("user-7"));
    }

    #[test]
    fn rejoining_player_is_a_no_op() {
        let mut room = room();
        join(&mut room, "alice");
        join(&mut room, "alice");

        assert_eq!(room.players.len(), 1);
        assert!(room.spectators.is_empty());
    }

    #[test]
    fn spectator_is_promoted_when_a_seat_frees_up() {
        let mut room = room();
        for i in 0..7 {
            join(&mut room, &format!("user-{i}"));
        }
        assert_eq!(role_of(&room, &"user-6".to_string()), Role::Spectator);

        apply_leave(&mut room, &"user-0".to_string()).unwrap();
        let role = join(&mut room, "user-6");

        assert_eq!(role, Role::Player);
        assert!(room.spectators.is_empty());
    }

    #[test]
    fn spectator_join_with_full_seats_stays_spectator() {
        let mut room = room();
        for i in 0..7 {
            join(&mut room, &format!("user-{i}"));
        }

        let role = join(&mut room, "user-6");

        assert_eq!(role, Role::Spectator);
        assert_eq!(room.players.len(), MAX_PLAYERS_PER_ROOM);
    }

    #[test]
    fn leave_removes_from_either_roster() {
        let mut room = room();
        for i in 0..7 {
            join(&mut room, &format!("user-{i}"));
        }

        apply_leave(&mut room, &"user-3".to_string()).unwrap();
        apply_leave(&mut room, &"user-6".to_string()).unwrap();

        assert!(!room.players.contains("user-3"));
        assert!(room.spectators.is_empty());
    }

    #[test]
    fn leave_by_non_member_fails() {
        let mut room = room();
        join(&mut room, "alice");

        let err = apply_leave(&mut room, &"bob".to_string()).unwrap_err();
        assert_eq!(err.room, "lobby");
    }

    #[test]
    fn reset_restores_the_canonical_state() {
        let before = SystemTime::now() - Duration::from_secs(600);
        let mut room = room();
        room.last_change = before;
        join(&mut room, "alice");
        room.hard_mode = true;
        room.kind = RoomKind::User;
        room.owner = Some("alice".into());
        room.initial_artist = ArtistRefEntity {
            id: Some("a1".into()),
            name: Some("Seed".into()),
        };

        let now = SystemTime::now();
        reset(&mut room, now);

        assert_eq!(
            room,
            RoomEntity {
                last_change: now,
                ..RoomEntity::fresh("lobby")
            }
        );
    }

    #[test]
    fn set_artists_stamps_only_on_actual_change() {
        let mut room = room();
        let t0 = SystemTime::UNIX_EPOCH;
        room.last_change = t0;

        let pair = (
            ArtistRefEntity {
                id: Some("a1".into()),
                name: Some("Seed".into()),
            },
            ArtistRefEntity {
                id: Some("a2".into()),
                name: Some("Target".into()),
            },
        );

        let t1 = t0 + Duration::from_secs(10);
        set_artists(&mut room, pair.0.clone(), pair.1.clone(), t1);
        assert_eq!(room.last_change, t1);

        let t2 = t1 + Duration::from_secs(10);
        set_artists(&mut room, pair.0, pair.1, t2);
        assert_eq!(room.last_change, t1);
    }

    #[test]
    fn idle_detection_uses_elapsed_wall_clock_time() {
        let threshold = Duration::from_secs(180);
        let now = SystemTime::now();

        let mut room = room();
        join(&mut room, "alice");

        room.last_change = now - Duration::from_secs(179);
        assert!(!is_idle(&room, now, threshold));

        room.last_change = now - Duration::from_secs(181);
        assert!(is_idle(&room, now, threshold));

        // An hour plus a few seconds is idle even though the minute-of-hour
        // values are close together.
        room.last_change = now - Duration::from_secs(3601);
        assert!(is_idle(&room, now, threshold));
    }

    #[test]
    fn canonical_empty_room_is_never_idle() {
        let now = SystemTime::now();
        let mut room = room();
        room.last_change = now - Duration::from_secs(3600);

        assert!(!is_idle(&room, now, Duration::from_secs(180)));
    }
}
