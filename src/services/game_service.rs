//! Game operations built on the catalog and the stored artist pool.

use rand::seq::IndexedRandom;
use time::OffsetDateTime;
use tracing::info;

use crate::{
    catalog::{
        discography::DiscographyFilter,
        matching::is_track_name_similar,
        models::{Artist, Track},
    },
    dao::models::{DailyChallengeEntity, StoredArtistEntity},
    error::ServiceError,
    state::SharedState,
};

/// Result of checking a guessed title against two artists' shared recordings.
#[derive(Debug, Clone)]
pub struct SongCheck {
    /// The matching shared recording, when the guess hit one.
    pub track: Option<Track>,
    /// Full records (with photos) for the artists credited on the match.
    pub credited_artists: Vec<Artist>,
}

impl SongCheck {
    /// Whether the guess matched a shared recording.
    pub fn found(&self) -> bool {
        self.track.is_some()
    }
}

/// Check whether `guess` names a recording shared by both artists.
///
/// The verdict comes from the aggregated discography of `artist_a`, never from
/// keyword search relevance. On a hit, the credited artists are fetched in
/// full so the response can carry their photos.
pub async fn check_song_for_two_artists(
    state: &SharedState,
    guess: &str,
    artist_a: &str,
    artist_b: &str,
    strict_mode: bool,
) -> Result<SongCheck, ServiceError> {
    let disco = state.discography();
    let shared = disco.features_between(artist_a, artist_b).await?;

    let track = shared
        .into_iter()
        .find(|track| is_track_name_similar(guess, &track.name, strict_mode));

    let credited_artists = match &track {
        Some(track) => {
            let ids: Vec<String> = track.artists.iter().map(|a| a.id.clone()).collect();
            disco.artists_with_photos(&ids).await?
        }
        None => Vec::new(),
    };

    info!(
        artist_a,
        artist_b,
        strict_mode,
        found = track.is_some(),
        "checked song guess"
    );

    Ok(SongCheck {
        track,
        credited_artists,
    })
}

/// Filtered search inside one artist's aggregated discography.
pub async fn search_discography(
    state: &SharedState,
    filter: &DiscographyFilter<'_>,
) -> Result<Vec<Track>, ServiceError> {
    Ok(state.discography().search_in_discography(filter).await?)
}

/// Every recording shared by the two artists.
pub async fn features_between(
    state: &SharedState,
    artist_a: &str,
    artist_b: &str,
) -> Result<Vec<Track>, ServiceError> {
    Ok(state.discography().features_between(artist_a, artist_b).await?)
}

/// The current daily challenge pair.
pub async fn daily_challenge(state: &SharedState) -> Result<DailyChallengeEntity, ServiceError> {
    let store = state.require_room_store().await?;
    store
        .find_daily_challenge()
        .await?
        .ok_or_else(|| ServiceError::NotFound("no daily challenge picked yet".into()))
}

/// Draw random starting artists from a genre, without touching storage.
pub async fn starting_artists(
    state: &SharedState,
    count: usize,
    genre: Option<&str>,
) -> Result<(Vec<Artist>, String), ServiceError> {
    Ok(state
        .discography()
        .random_artists_from_genre(count, genre)
        .await?)
}

/// Rebuild the stored artist pool from a genre draw. Returns the pool size.
pub async fn refresh_artist_pool(state: &SharedState) -> Result<usize, ServiceError> {
    let store = state.require_room_store().await?;
    let (artists, genre) = state
        .discography()
        .random_artists_from_genre(state.config.pool_size, Some(&state.config.pool_genre))
        .await?;

    let pool: Vec<StoredArtistEntity> = artists
        .into_iter()
        .map(|artist| StoredArtistEntity {
            id: artist.id,
            name: artist.name,
            photo_url: artist.photo_url,
        })
        .collect();

    let size = pool.len();
    store.replace_artists(pool).await?;
    info!(genre, size, "refreshed stored artist pool");
    Ok(size)
}

/// Pick today's challenge pair from the stored pool and persist it.
pub async fn pick_daily_challenge(
    state: &SharedState,
) -> Result<DailyChallengeEntity, ServiceError> {
    let store = state.require_room_store().await?;
    let pool = store.list_artists().await?;

    // The rng is not Send; keep it out of scope before the next await.
    let (initial, final_artist) = {
        let mut rng = rand::rng();
        let mut picks = pool.choose_multiple(&mut rng, 2);
        match (picks.next(), picks.next()) {
            (Some(first), Some(second)) => (first.clone(), second.clone()),
            _ => {
                return Err(ServiceError::InvalidState(
                    "artist pool holds fewer than two artists".into(),
                ));
            }
        }
    };

    let challenge = DailyChallengeEntity {
        date: today(),
        initial_artist: initial,
        final_artist,
    };

    store.save_daily_challenge(challenge.clone()).await?;
    info!(date = %challenge.date, "picked daily challenge");
    Ok(challenge)
}

/// Today's UTC date as `YYYY-MM-DD`.
fn today() -> String {
    let date = OffsetDateTime::now_utc().date();
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_is_iso_formatted() {
        let date = today();
        assert_eq!(date.len(), 10);
        let parts: Vec<&str> = date.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 2);
    }
}
