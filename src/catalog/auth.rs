//! Client-credentials bearer token management for the catalog API.

use std::time::{Duration, SystemTime};

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{catalog::error::AuthError, config::CatalogConfig};

/// Treat credentials as expired slightly before the catalog does, so a token
/// handed out here survives the request it is used for.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_LIFETIME_SECS: u64 = 3600;

/// A short-lived bearer credential for catalog API calls.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Bearer token value.
    pub token: String,
    /// Instant after which the catalog will reject the token.
    pub expires_at: SystemTime,
}

impl Credential {
    fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_SKEW >= self.expires_at
    }
}

/// Exchanges a fixed client id/secret pair for bearer credentials and caches
/// the result until it expires or a caller invalidates it after a 401.
pub struct TokenProvider {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: RwLock<Option<Credential>>,
}

impl TokenProvider {
    /// Build a provider from the catalog configuration, sharing the given
    /// HTTP client.
    pub fn new(http: reqwest::Client, config: &CatalogConfig) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cached: RwLock::new(None),
        }
    }

    /// Return a valid bearer token, exchanging credentials when the cached
    /// one is missing or expired.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        if let Some(credential) = self.cached.read().await.as_ref() {
            if !credential.is_expired() {
                return Ok(credential.token.clone());
            }
        }

        let mut slot = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(credential) = slot.as_ref() {
            if !credential.is_expired() {
                return Ok(credential.token.clone());
            }
        }

        let credential = self.exchange().await?;
        let token = credential.token.clone();
        *slot = Some(credential);
        Ok(token)
    }

    /// Drop the cached credential so the next call performs a fresh exchange.
    /// Called when a catalog request comes back unauthorized.
    pub async fn invalidate(&self) {
        self.cached.write().await.take();
    }

    async fn exchange(&self) -> Result<Credential, AuthError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|source| AuthError::Exchange {
                endpoint: self.token_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                endpoint: self.token_url.clone(),
                status,
            });
        }

        let payload =
            response
                .json::<TokenResponse>()
                .await
                .map_err(|source| AuthError::Decode {
                    endpoint: self.token_url.clone(),
                    source,
                })?;

        debug!(expires_in = payload.expires_in, "obtained catalog credential");

        Ok(Credential {
            token: payload.access_token,
            expires_at: SystemTime::now() + Duration::from_secs(payload.expires_in),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_lifetime")]
    expires_in: u64,
}

fn default_lifetime() -> u64 {
    DEFAULT_LIFETIME_SECS
}
