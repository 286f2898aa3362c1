//! Synthetic catalog used by unit tests across the crate.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use futures::future::{BoxFuture, ready};
use futures::FutureExt;
use reqwest::StatusCode;

use crate::catalog::{
    CatalogApi,
    error::FetchError,
    models::{Album, AlbumType, Artist, Page, Track},
};

/// Build a test artist.
pub fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        photo_url: None,
    }
}

/// Build a test track credited to the given artist ids.
pub fn track(id: &str, name: &str, artist_ids: &[&str]) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: artist_ids
            .iter()
            .map(|artist_id| artist(artist_id, &format!("artist {artist_id}")))
            .collect(),
    }
}

/// Build a full test album embedding its track list.
pub fn album(id: &str, name: &str, tracks: Vec<Track>) -> Album {
    Album {
        id: id.to_string(),
        name: name.to_string(),
        album_type: AlbumType::Album,
        total_tracks: tracks.len() as u32,
        artists: Vec::new(),
        tracks,
    }
}

/// In-memory [`CatalogApi`] with per-endpoint call counters.
#[derive(Default)]
pub struct StubCatalog {
    albums_by_artist: Mutex<HashMap<String, Vec<Album>>>,
    search_results: Mutex<Vec<Artist>>,
    genres: Mutex<Vec<String>>,
    fail_albums: AtomicBool,
    /// Number of album-page requests served.
    pub album_page_requests: AtomicUsize,
    /// Number of album-batch requests served.
    pub album_batch_requests: AtomicUsize,
}

impl StubCatalog {
    /// Register a full album under an artist's discography.
    pub fn add_album(&self, artist_id: &str, album: Album) {
        self.albums_by_artist
            .lock()
            .unwrap()
            .entry(artist_id.to_string())
            .or_default()
            .push(album);
    }

    /// Make every album-batch request fail with a synthetic status error.
    pub fn fail_albums_by_ids(&self) {
        self.fail_albums.store(true, Ordering::SeqCst);
    }

    /// Replace the genre seed list.
    pub fn set_genres(&self, genres: &[&str]) {
        *self.genres.lock().unwrap() = genres.iter().map(|g| g.to_string()).collect();
    }

    /// Replace the artist search pool; searches cycle through it by offset.
    pub fn set_search_results(&self, artists: Vec<Artist>) {
        *self.search_results.lock().unwrap() = artists;
    }

    fn all_albums(&self) -> Vec<Album> {
        self.albums_by_artist
            .lock()
            .unwrap()
            .values()
            .flatten()
            .cloned()
            .collect()
    }
}

impl CatalogApi for StubCatalog {
    fn artist_albums_page(
        &self,
        artist_id: String,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'static, Result<Page<Album>, FetchError>> {
        self.album_page_requests.fetch_add(1, Ordering::SeqCst);
        let albums = self
            .albums_by_artist
            .lock()
            .unwrap()
            .get(&artist_id)
            .cloned()
            .unwrap_or_default();
        let total = albums.len();
        let items = albums
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|mut album| {
                // List results do not embed track lists.
                album.tracks.clear();
                album
            })
            .collect();
        ready(Ok(Page { total, items })).boxed()
    }

    fn albums_by_ids(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<Album>, FetchError>> {
        self.album_batch_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_albums.load(Ordering::SeqCst) {
            return ready(Err(FetchError::Status {
                endpoint: "albums".into(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
            }))
            .boxed();
        }
        let albums = self
            .all_albums()
            .into_iter()
            .filter(|album| ids.contains(&album.id))
            .collect();
        ready(Ok(albums)).boxed()
    }

    fn artists_by_ids(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<Artist>, FetchError>> {
        let artists = ids
            .into_iter()
            .map(|id| Artist {
                name: format!("artist {id}"),
                photo_url: Some(format!("https://img.example/{id}.jpg")),
                id,
            })
            .collect();
        ready(Ok(artists)).boxed()
    }

    fn search_artists_page(
        &self,
        _query: String,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'static, Result<Page<Artist>, FetchError>> {
        let pool = self.search_results.lock().unwrap().clone();
        let total = pool.len();
        let items = if pool.is_empty() {
            Vec::new()
        } else {
            pool.into_iter().cycle().skip(offset).take(limit).collect()
        };
        ready(Ok(Page { total, items })).boxed()
    }

    fn available_genres(&self) -> BoxFuture<'static, Result<Vec<String>, FetchError>> {
        ready(Ok(self.genres.lock().unwrap().clone())).boxed()
    }
}
