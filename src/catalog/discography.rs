//! Discography aggregation: flattening an artist's full catalog output and
//! filtering it down to game-relevant tracks.

use std::sync::Arc;

use rand::{Rng, seq::IndexedRandom};
use tracing::info;

use crate::catalog::{
    CatalogApi,
    error::{AggregationError, FetchError},
    matching::is_track_name_similar,
    models::{Artist, Track},
    paging::{ALBUM_BATCH_SIZE, ARTIST_BATCH_SIZE, PAGE_LIMIT, fetch_all_pages, fetch_by_ids_batched},
};

/// Spread of random offsets used when drawing artists from a genre search.
const GENRE_SEARCH_SPREAD: usize = 300;

/// Search requests allowed per requested artist in a genre draw. Bounds the
/// draw on sparse genres, where random offsets keep landing on the same few
/// artists or on empty pages.
const GENRE_DRAW_ATTEMPTS_PER_ARTIST: usize = 3;

/// Filter applied to an aggregated discography.
#[derive(Debug, Clone)]
pub struct DiscographyFilter<'a> {
    /// Keep only tracks whose title is similar to this guess, when present.
    pub track_name: Option<&'a str>,
    /// Keep only tracks crediting more than one artist.
    pub require_multiple_artists: bool,
    /// Keep only tracks crediting `artist_id`.
    pub require_this_artist: bool,
    /// The artist the discography belongs to.
    pub artist_id: &'a str,
    /// Title matching mode for `track_name`.
    pub strict_mode: bool,
}

/// Aggregates catalog results into full artist discographies.
///
/// Ground truth for "are these two artists linked by a shared recording":
/// it enumerates every release rather than trusting search relevance.
#[derive(Clone)]
pub struct Discography {
    catalog: Arc<dyn CatalogApi>,
}

impl Discography {
    /// Wrap a catalog handle.
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    /// Every track on every album the artist appears on, including singles,
    /// compilations and "appears on" releases.
    ///
    /// No de-duplication: a track released on both an album and a compilation
    /// appears twice. Callers needing uniqueness de-dup by track id.
    pub async fn artist_discography(&self, artist_id: &str) -> Result<Vec<Track>, AggregationError> {
        let wrap = |source: FetchError| AggregationError {
            artist_id: artist_id.to_string(),
            source,
        };

        let albums = fetch_all_pages(PAGE_LIMIT, |offset| {
            self.catalog
                .artist_albums_page(artist_id.to_string(), offset, PAGE_LIMIT)
        })
        .await
        .map_err(wrap)?;

        let album_ids: Vec<String> = albums.into_iter().map(|album| album.id).collect();

        let full_albums = fetch_by_ids_batched(&album_ids, ALBUM_BATCH_SIZE, |ids| {
            self.catalog.albums_by_ids(ids)
        })
        .await
        .map_err(wrap)?;

        Ok(full_albums
            .into_iter()
            .flat_map(|album| album.tracks)
            .collect())
    }

    /// Keep the tracks satisfying every enabled predicate of `filter`.
    pub fn filter_discography(tracks: Vec<Track>, filter: &DiscographyFilter<'_>) -> Vec<Track> {
        tracks
            .into_iter()
            .filter(|track| {
                (!filter.require_multiple_artists || track.artists.len() > 1)
                    && (!filter.require_this_artist || track.credits_artist(filter.artist_id))
                    && filter.track_name.is_none_or(|name| {
                        is_track_name_similar(name, &track.name, filter.strict_mode)
                    })
            })
            .collect()
    }

    /// Aggregate and filter an artist's discography in one call.
    pub async fn search_in_discography(
        &self,
        filter: &DiscographyFilter<'_>,
    ) -> Result<Vec<Track>, AggregationError> {
        let tracks = self.artist_discography(filter.artist_id).await?;
        let found = tracks.len();
        let filtered = Self::filter_discography(tracks, filter);
        info!(
            artist_id = filter.artist_id,
            found,
            kept = filtered.len(),
            "filtered artist discography"
        );
        Ok(filtered)
    }

    /// Every recording shared by two artists: the discography of `artist_a`
    /// restricted to multi-artist tracks crediting both ids.
    pub async fn features_between(
        &self,
        artist_a: &str,
        artist_b: &str,
    ) -> Result<Vec<Track>, AggregationError> {
        let filter = DiscographyFilter {
            track_name: None,
            require_multiple_artists: true,
            require_this_artist: true,
            artist_id: artist_a,
            strict_mode: false,
        };
        let shared = self.search_in_discography(&filter).await?;

        // Every track already credits artist_a; keep the ones that also
        // credit artist_b.
        Ok(shared
            .into_iter()
            .filter(|track| track.credits_artist(artist_b))
            .collect())
    }

    /// Full artist records (with photo URLs) for a set of artist ids.
    pub async fn artists_with_photos(&self, ids: &[String]) -> Result<Vec<Artist>, FetchError> {
        fetch_by_ids_batched(ids, ARTIST_BATCH_SIZE, |chunk| {
            self.catalog.artists_by_ids(chunk)
        })
        .await
    }

    /// Draw `count` random artists from one genre.
    ///
    /// Uses the requested genre when the catalog offers it as a seed,
    /// otherwise a random seed. Each artist comes from an individual
    /// single-result search at a random offset, then the full records are
    /// fetched so photo URLs are attached. The number of search requests is
    /// bounded; a sparse genre yields fewer artists than asked for rather
    /// than retrying forever.
    pub async fn random_artists_from_genre(
        &self,
        count: usize,
        genre: Option<&str>,
    ) -> Result<(Vec<Artist>, String), FetchError> {
        let genres = self.catalog.available_genres().await?;
        let selected = genre
            .filter(|wanted| genres.iter().any(|seed| seed == wanted))
            .map(str::to_string)
            .or_else(|| genres.choose(&mut rand::rng()).cloned())
            .unwrap_or_default();

        let mut drawn: Vec<Artist> = Vec::with_capacity(count);
        let mut attempts_left = count * GENRE_DRAW_ATTEMPTS_PER_ARTIST;
        while drawn.len() < count && attempts_left > 0 {
            attempts_left -= 1;
            let offset = rand::rng().random_range(0..GENRE_SEARCH_SPREAD);
            let page = self
                .catalog
                .search_artists_page(format!("genre:{selected}"), offset, 1)
                .await?;
            let Some(artist) = page.items.into_iter().next() else {
                continue;
            };
            if !drawn.iter().any(|existing| existing.id == artist.id) {
                drawn.push(artist);
            }
        }

        let ids: Vec<String> = drawn.iter().map(|artist| artist.id.clone()).collect();
        let full = self.artists_with_photos(&ids).await?;
        Ok((full, selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{StubCatalog, album, artist, track};

    fn stub_with_two_artists() -> StubCatalog {
        // Artist "a1" has a solo track, a collaboration with "a2", and a
        // collaboration with "a3". The collaboration with "a2" also shows up
        // on a compilation, so it is duplicated in the flattened discography.
        let collab_a2 = track("t2", "Linked Up (feat. Other)", &["a1", "a2"]);
        let stub = StubCatalog::default();
        stub.add_album(
            "a1",
            album("al1", "First", vec![
                track("t1", "Solo Cut", &["a1"]),
                collab_a2.clone(),
            ]),
        );
        stub.add_album(
            "a1",
            album("al2", "Features", vec![
                track("t3", "Crossover", &["a1", "a3"]),
            ]),
        );
        stub.add_album("a1", album("al3", "Best Of", vec![collab_a2]));
        stub
    }

    #[tokio::test]
    async fn discography_flattens_albums_and_keeps_duplicates() {
        let disco = Discography::new(Arc::new(stub_with_two_artists()));
        let tracks = disco.artist_discography("a1").await.unwrap();

        assert_eq!(tracks.len(), 4);
        let linked = tracks.iter().filter(|t| t.id == "t2").count();
        assert_eq!(linked, 2, "compilation copies are not de-duplicated");
    }

    #[tokio::test]
    async fn features_between_keeps_only_shared_recordings() {
        let disco = Discography::new(Arc::new(stub_with_two_artists()));
        let features = disco.features_between("a1", "a2").await.unwrap();

        assert!(!features.is_empty());
        assert!(features.iter().all(|t| t.id == "t2"));
    }

    #[tokio::test]
    async fn features_between_is_a_subset_of_the_filtered_discography() {
        let disco = Discography::new(Arc::new(stub_with_two_artists()));

        let features = disco.features_between("a1", "a2").await.unwrap();
        let discography = disco.artist_discography("a1").await.unwrap();
        let expected: Vec<_> = discography
            .into_iter()
            .filter(|t| t.artists.len() > 1 && t.credits_artist("a1") && t.credits_artist("a2"))
            .collect();

        assert_eq!(features, expected);
    }

    #[tokio::test]
    async fn filter_by_track_name_uses_the_matcher() {
        let disco = Discography::new(Arc::new(stub_with_two_artists()));
        let filter = DiscographyFilter {
            track_name: Some("Linked Up"),
            require_multiple_artists: true,
            require_this_artist: true,
            artist_id: "a1",
            strict_mode: true,
        };

        let tracks = disco.search_in_discography(&filter).await.unwrap();
        assert!(tracks.iter().all(|t| t.id == "t2"));
        assert!(!tracks.is_empty());
    }

    #[tokio::test]
    async fn aggregation_failure_propagates_without_partial_results() {
        let stub = stub_with_two_artists();
        stub.fail_albums_by_ids();
        let disco = Discography::new(Arc::new(stub));

        let result = disco.artist_discography("a1").await;
        let err = result.unwrap_err();
        assert_eq!(err.artist_id, "a1");
    }

    #[tokio::test]
    async fn random_artists_prefers_requested_genre_when_seeded() {
        let stub = StubCatalog::default();
        stub.set_genres(&["indie", "jazz"]);
        stub.set_search_results(vec![artist("a9", "Niner"), artist("a8", "Eighter")]);
        let disco = Discography::new(Arc::new(stub));

        let (artists, genre) = disco.random_artists_from_genre(2, Some("jazz")).await.unwrap();
        assert_eq!(genre, "jazz");
        assert_eq!(artists.len(), 2);
    }

    #[tokio::test]
    async fn random_artists_draw_terminates_on_a_sparse_genre() {
        // One artist in the genre: a draw of two can never find a second
        // distinct id, so the attempt budget must stop the search.
        let stub = StubCatalog::default();
        stub.set_genres(&["jazz"]);
        stub.set_search_results(vec![artist("a9", "Niner")]);
        let disco = Discography::new(Arc::new(stub));

        let (artists, _) = disco.random_artists_from_genre(2, Some("jazz")).await.unwrap();
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].id, "a9");
    }

    #[tokio::test]
    async fn random_artists_draw_terminates_on_empty_search_results() {
        let stub = StubCatalog::default();
        stub.set_genres(&["jazz"]);
        let disco = Discography::new(Arc::new(stub));

        let (artists, _) = disco.random_artists_from_genre(2, Some("jazz")).await.unwrap();
        assert!(artists.is_empty());
    }
}
