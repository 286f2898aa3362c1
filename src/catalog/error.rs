//! Error types shared by the catalog layer.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures during the client-credentials exchange. Fatal for the in-flight
/// request; callers surface the error instead of retrying indefinitely.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token request could not be sent.
    #[error("failed to send credential exchange to `{endpoint}`")]
    Exchange {
        /// Token endpoint URL.
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The token endpoint rejected the exchange (bad client credentials).
    #[error("credential exchange rejected by `{endpoint}` with status {status}")]
    Rejected {
        /// Token endpoint URL.
        endpoint: String,
        /// HTTP status returned by the token endpoint.
        status: StatusCode,
    },
    /// The token response payload could not be parsed.
    #[error("failed to decode credential response from `{endpoint}`")]
    Decode {
        /// Token endpoint URL.
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A single catalog HTTP call failed. Aborts the aggregate operation it was
/// part of; no partial results are returned.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Obtaining a bearer credential for the call failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The request could not be sent.
    #[error("failed to send catalog request to `{endpoint}`")]
    Send {
        /// Catalog endpoint path.
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The catalog returned an unexpected status code.
    #[error("unexpected catalog response status {status} for `{endpoint}`")]
    Status {
        /// Catalog endpoint path.
        endpoint: String,
        /// HTTP status returned by the catalog.
        status: StatusCode,
    },
    /// The response payload could not be parsed.
    #[error("failed to decode catalog response from `{endpoint}`")]
    Decode {
        /// Catalog endpoint path.
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A fetch failed while building an artist discography. A partial discography
/// would silently produce wrong game verdicts, so the whole build aborts.
#[derive(Debug, Error)]
#[error("failed to aggregate discography for artist `{artist_id}`")]
pub struct AggregationError {
    /// Artist whose discography was being assembled.
    pub artist_id: String,
    #[source]
    /// The catalog call that failed.
    pub source: FetchError,
}
