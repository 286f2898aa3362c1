//! HTTP client for the Spotify Web API.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};

use crate::catalog::{
    CatalogApi,
    auth::TokenProvider,
    error::FetchError,
    models::{Album, AlbumType, Artist, Page, Track},
};

/// Catalog client speaking the Spotify Web API wire format.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: Arc<str>,
    tokens: Arc<TokenProvider>,
}

impl SpotifyClient {
    /// Build a client against the given API base URL (no trailing slash).
    pub fn new(http: reqwest::Client, api_base: &str, tokens: Arc<TokenProvider>) -> Self {
        Self {
            http,
            api_base: Arc::from(api_base.trim_end_matches('/')),
            tokens,
        }
    }

    /// Issue an authenticated GET and decode the JSON payload.
    ///
    /// On a 401 the cached credential is dropped and the request retried once
    /// with a freshly exchanged token.
    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.api_base, path);

        let token = self.tokens.get_token().await?;
        let mut response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Send {
                endpoint: path.to_string(),
                source,
            })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
            let token = self.tokens.get_token().await?;
            response = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .query(query)
                .send()
                .await
                .map_err(|source| FetchError::Send {
                    endpoint: path.to_string(),
                    source,
                })?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status,
            });
        }

        response.json::<T>().await.map_err(|source| FetchError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }
}

impl CatalogApi for SpotifyClient {
    fn artist_albums_page(
        &self,
        artist_id: String,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'static, Result<Page<Album>, FetchError>> {
        let client = self.clone();
        Box::pin(async move {
            let path = format!("artists/{artist_id}/albums");
            let query = [("offset", offset.to_string()), ("limit", limit.to_string())];
            let page = client.get_json::<Page<WireAlbum>>(&path, &query).await?;
            Ok(page.map(WireAlbum::into_album))
        })
    }

    fn albums_by_ids(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<Album>, FetchError>> {
        let client = self.clone();
        Box::pin(async move {
            let query = [("ids", ids.join(","))];
            let envelope = client.get_json::<AlbumsEnvelope>("albums", &query).await?;
            Ok(envelope
                .albums
                .into_iter()
                .map(WireAlbum::into_album)
                .collect())
        })
    }

    fn artists_by_ids(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<Artist>, FetchError>> {
        let client = self.clone();
        Box::pin(async move {
            let query = [("ids", ids.join(","))];
            let envelope = client.get_json::<ArtistsEnvelope>("artists", &query).await?;
            Ok(envelope
                .artists
                .into_iter()
                .map(WireArtist::into_artist)
                .collect())
        })
    }

    fn search_artists_page(
        &self,
        query: String,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'static, Result<Page<Artist>, FetchError>> {
        let client = self.clone();
        Box::pin(async move {
            let query = [
                ("q", query),
                ("type", "artist".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ];
            let envelope = client.get_json::<SearchEnvelope>("search", &query).await?;
            Ok(envelope.artists.map(WireArtist::into_artist))
        })
    }

    fn available_genres(&self) -> BoxFuture<'static, Result<Vec<String>, FetchError>> {
        let client = self.clone();
        Box::pin(async move {
            let envelope = client
                .get_json::<GenresEnvelope>("recommendations/available-genre-seeds", &[])
                .await?;
            Ok(envelope.genres)
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct WireArtist {
    id: String,
    name: String,
    #[serde(default)]
    images: Vec<WireImage>,
}

impl WireArtist {
    fn into_artist(self) -> Artist {
        Artist {
            id: self.id,
            name: self.name,
            // The last entry is the smallest rendition; enough for avatars.
            photo_url: self.images.into_iter().last().map(|image| image.url),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireTrack {
    id: String,
    name: String,
    artists: Vec<WireArtist>,
}

impl WireTrack {
    fn into_track(self) -> Track {
        Track {
            id: self.id,
            name: self.name,
            artists: self
                .artists
                .into_iter()
                .map(WireArtist::into_artist)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireTrackPage {
    items: Vec<WireTrack>,
}

#[derive(Debug, Deserialize)]
struct WireAlbum {
    id: String,
    name: String,
    album_type: AlbumType,
    total_tracks: u32,
    artists: Vec<WireArtist>,
    #[serde(default)]
    tracks: Option<WireTrackPage>,
}

impl WireAlbum {
    fn into_album(self) -> Album {
        Album {
            id: self.id,
            name: self.name,
            album_type: self.album_type,
            total_tracks: self.total_tracks,
            artists: self
                .artists
                .into_iter()
                .map(WireArtist::into_artist)
                .collect(),
            tracks: self
                .tracks
                .map(|page| page.items.into_iter().map(WireTrack::into_track).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlbumsEnvelope {
    albums: Vec<WireAlbum>,
}

#[derive(Debug, Deserialize)]
struct ArtistsEnvelope {
    artists: Vec<WireArtist>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    artists: Page<WireArtist>,
}

#[derive(Debug, Deserialize)]
struct GenresEnvelope {
    genres: Vec<String>,
}
