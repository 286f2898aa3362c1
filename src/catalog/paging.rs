//! Generic support for exhausting paginated result sets and chunked multi-id
//! endpoints.

use std::future::Future;

use futures::future::try_join_all;

use crate::catalog::{error::FetchError, models::Page};

/// Page size used for every paginated catalog endpoint.
pub const PAGE_LIMIT: usize = 50;

/// Per-request id cap on the artists and tracks endpoints.
pub const ARTIST_BATCH_SIZE: usize = 50;

/// Per-request id cap on the albums endpoint.
pub const ALBUM_BATCH_SIZE: usize = 20;

/// Fetch every item of a paginated result set.
///
/// Issues the page at offset 0 first, computes the remaining page count from
/// the reported total, then issues the follow-up pages concurrently. Results
/// are concatenated in request order regardless of completion order. When the
/// total fits in one page no follow-up request is made.
pub async fn fetch_all_pages<T, F, Fut>(limit: usize, request_page: F) -> Result<Vec<T>, FetchError>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let first = request_page(0).await?;
    let total = first.total;
    let mut items = first.items;

    if total <= limit {
        return Ok(items);
    }

    let remaining_pages = (total - limit).div_ceil(limit);
    let follow_ups = (1..=remaining_pages).map(|index| request_page(index * limit));
    for page in try_join_all(follow_ups).await? {
        items.extend(page.items);
    }

    Ok(items)
}

/// Fetch entities for a list of ids through a chunked multi-id endpoint.
///
/// Splits `ids` into `batch_size` chunks, issues the chunk requests
/// concurrently, and concatenates the results in chunk order. Callers that
/// need per-id correlation must re-index on the returned entity ids.
pub async fn fetch_by_ids_batched<T, F, Fut>(
    ids: &[String],
    batch_size: usize,
    request_batch: F,
) -> Result<Vec<T>, FetchError>
where
    F: Fn(Vec<String>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, FetchError>>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let batches = ids.chunks(batch_size).map(|chunk| request_batch(chunk.to_vec()));
    let results = try_join_all(batches).await?;
    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn synthetic_page(total: usize, limit: usize, offset: usize) -> Page<usize> {
        let end = total.min(offset + limit);
        Page {
            total,
            items: (offset..end).collect(),
        }
    }

    #[tokio::test]
    async fn fetch_all_pages_exhausts_a_large_result_set() {
        let requests = AtomicUsize::new(0);
        let items = fetch_all_pages(50, |offset| {
            requests.fetch_add(1, Ordering::SeqCst);
            async move { Ok(synthetic_page(125, 50, offset)) }
        })
        .await
        .unwrap();

        assert_eq!(requests.load(Ordering::SeqCst), 3);
        assert_eq!(items.len(), 125);
        // Request order preserved, not arrival order.
        assert_eq!(items, (0..125).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn fetch_all_pages_stops_after_one_page_when_total_fits() {
        let requests = AtomicUsize::new(0);
        let items = fetch_all_pages(50, |offset| {
            requests.fetch_add(1, Ordering::SeqCst);
            async move { Ok(synthetic_page(12, 50, offset)) }
        })
        .await
        .unwrap();

        assert_eq!(requests.load(Ordering::SeqCst), 1);
        assert_eq!(items.len(), 12);
    }

    #[tokio::test]
    async fn fetch_all_pages_handles_empty_result_set() {
        let items = fetch_all_pages(50, |offset| async move {
            Ok(synthetic_page(0, 50, offset))
        })
        .await
        .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn fetch_all_pages_aborts_on_page_failure() {
        let result: Result<Vec<usize>, _> = fetch_all_pages(50, |offset| async move {
            if offset == 0 {
                Ok(synthetic_page(125, 50, 0))
            } else {
                Err(FetchError::Status {
                    endpoint: "albums".into(),
                    status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                })
            }
        })
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn fetch_by_ids_batched_chunks_in_input_order() {
        let ids: Vec<String> = (0..120).map(|i| format!("id-{i:03}")).collect();
        let requests = AtomicUsize::new(0);

        let fetched = fetch_by_ids_batched(&ids, 50, |chunk| {
            requests.fetch_add(1, Ordering::SeqCst);
            async move { Ok(chunk) }
        })
        .await
        .unwrap();

        assert_eq!(requests.load(Ordering::SeqCst), 3);
        assert_eq!(fetched, ids);
    }

    #[tokio::test]
    async fn fetch_by_ids_batched_skips_request_for_no_ids() {
        let requests = AtomicUsize::new(0);
        let fetched: Vec<String> = fetch_by_ids_batched(&[], 50, |chunk| {
            requests.fetch_add(1, Ordering::SeqCst);
            async move { Ok(chunk) }
        })
        .await
        .unwrap();

        assert_eq!(requests.load(Ordering::SeqCst), 0);
        assert!(fetched.is_empty());
    }
}
