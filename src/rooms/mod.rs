//! Room membership rules and the service coordinating them with storage.

pub mod lifecycle;
pub mod service;

pub use lifecycle::{MAX_PLAYERS_PER_ROOM, Role};
pub use service::RoomService;
