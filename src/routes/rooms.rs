use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::rooms::{
        JoinRoomRequest, JoinRoomResponse, LeaveRoomRequest, LeaveRoomResponse, NewArtistsResponse,
        RoomSnapshot,
    },
    error::AppError,
    state::SharedState,
};

/// Routes handling room membership and challenge rolls.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms/{name}", get(get_room))
        .route("/rooms/{name}/join", post(join_room))
        .route("/rooms/{name}/leave", post(leave_room))
        .route("/rooms/{name}/artists", post(new_room_artists))
}

/// Fetch the current state of a room.
pub async fn get_room(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let service = state.room_service().await.map_err(AppError::from)?;
    let room = service.get_room(&name).await?;
    Ok(Json(room.into()))
}

/// Join a room as a player, or as a spectator when all seats are taken.
pub async fn join_room(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    payload.validate()?;
    let service = state.room_service().await.map_err(AppError::from)?;
    let role = service.join_room(&name, payload.user_id).await?;
    Ok(Json(JoinRoomResponse { role }))
}

/// Leave a room. The last member out resets the room.
pub async fn leave_room(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(payload): Json<LeaveRoomRequest>,
) -> Result<Json<LeaveRoomResponse>, AppError> {
    payload.validate()?;
    let service = state.room_service().await.map_err(AppError::from)?;
    let removed = service.leave_room(&name, payload.user_id).await?;
    Ok(Json(LeaveRoomResponse { removed }))
}

/// Roll a fresh challenge pair for the room from the stored artist pool.
pub async fn new_room_artists(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<NewArtistsResponse>, AppError> {
    let service = state.room_service().await.map_err(AppError::from)?;
    let (initial, final_artist) = service.set_new_room_artists(&name).await?;
    Ok(Json(NewArtistsResponse {
        initial_artist: initial.into(),
        final_artist: final_artist.into(),
    }))
}
