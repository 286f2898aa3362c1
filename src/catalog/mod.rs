//! Music catalog layer: credential exchange, paginated/batched fetching,
//! discography aggregation, and track-title matching.

pub mod auth;
pub mod client;
pub mod discography;
pub mod error;
pub mod matching;
pub mod models;
pub mod paging;

#[cfg(test)]
pub mod testing;

use futures::future::BoxFuture;

use crate::catalog::{
    error::FetchError,
    models::{Album, Artist, Page},
};

/// Abstraction over the remote music catalog API.
///
/// The real implementation is [`client::SpotifyClient`]; tests substitute a
/// synthetic catalog so aggregation logic can be exercised without I/O.
pub trait CatalogApi: Send + Sync {
    /// One page of the albums an artist appears on (any album type).
    fn artist_albums_page(
        &self,
        artist_id: String,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'static, Result<Page<Album>, FetchError>>;

    /// Full album records, including embedded track lists, for up to one
    /// batch of album ids.
    fn albums_by_ids(&self, ids: Vec<String>)
    -> BoxFuture<'static, Result<Vec<Album>, FetchError>>;

    /// Full artist records for up to one batch of artist ids.
    fn artists_by_ids(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<Artist>, FetchError>>;

    /// One page of an artist keyword search.
    fn search_artists_page(
        &self,
        query: String,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'static, Result<Page<Artist>, FetchError>>;

    /// Genre seeds the catalog accepts in search queries.
    fn available_genres(&self) -> BoxFuture<'static, Result<Vec<String>, FetchError>>;
}
