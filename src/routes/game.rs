use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    catalog::discography::DiscographyFilter,
    dto::game::{
        CheckSongRequest, CheckSongResponse, DailyChallengeResponse, DiscographySearchRequest,
        FeaturesRequest, StartingArtistsRequest, StartingArtistsResponse, TrackListResponse,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling catalog-backed game operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/game/check", post(check_song))
        .route("/game/discography/search", post(search_discography))
        .route("/game/features", post(features))
        .route("/game/daily", get(daily_challenge))
        .route("/game/starting-artists", post(starting_artists))
}

/// Check whether a guessed title names a recording shared by two artists.
pub async fn check_song(
    State(state): State<SharedState>,
    Json(payload): Json<CheckSongRequest>,
) -> Result<Json<CheckSongResponse>, AppError> {
    payload.validate()?;
    let verdict = game_service::check_song_for_two_artists(
        &state,
        &payload.guess,
        &payload.artist_a,
        &payload.artist_b,
        payload.hard_mode,
    )
    .await?;

    Ok(Json(CheckSongResponse {
        found: verdict.found(),
        track: verdict.track.map(Into::into),
        artists: verdict.credited_artists.into_iter().map(Into::into).collect(),
    }))
}

/// Search an artist's aggregated discography.
pub async fn search_discography(
    State(state): State<SharedState>,
    Json(payload): Json<DiscographySearchRequest>,
) -> Result<Json<TrackListResponse>, AppError> {
    payload.validate()?;
    let filter = DiscographyFilter {
        track_name: payload.track_name.as_deref(),
        require_multiple_artists: payload.only_collaborations,
        require_this_artist: payload.require_this_artist,
        artist_id: &payload.artist_id,
        strict_mode: payload.strict_mode,
    };
    let tracks = game_service::search_discography(&state, &filter).await?;
    Ok(Json(TrackListResponse {
        tracks: tracks.into_iter().map(Into::into).collect(),
    }))
}

/// List every recording shared by two artists.
pub async fn features(
    State(state): State<SharedState>,
    Json(payload): Json<FeaturesRequest>,
) -> Result<Json<TrackListResponse>, AppError> {
    payload.validate()?;
    let tracks =
        game_service::features_between(&state, &payload.artist_a, &payload.artist_b).await?;
    Ok(Json(TrackListResponse {
        tracks: tracks.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch the current daily challenge pair.
pub async fn daily_challenge(
    State(state): State<SharedState>,
) -> Result<Json<DailyChallengeResponse>, AppError> {
    let challenge = game_service::daily_challenge(&state).await?;
    Ok(Json(challenge.into()))
}

/// Draw random starting artists from a genre.
pub async fn starting_artists(
    State(state): State<SharedState>,
    Json(payload): Json<StartingArtistsRequest>,
) -> Result<Json<StartingArtistsResponse>, AppError> {
    payload.validate()?;
    let (artists, genre) =
        game_service::starting_artists(&state, payload.count, payload.genre.as_deref()).await?;
    Ok(Json(StartingArtistsResponse {
        artists: artists.into_iter().map(Into::into).collect(),
        genre,
    }))
}
