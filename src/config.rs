//! Application-level configuration, read from the environment at startup.

use std::{env, time::Duration};

/// Default HTTP listen port.
const DEFAULT_PORT: u16 = 3000;
/// Default OAuth token endpoint for the catalog.
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Default catalog API base URL.
const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
/// How often the reclaim sweep scans rooms.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// How long a room may keep its challenge unchanged before being reclaimed.
const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(180);
/// How often the daily refresh job runs.
const DEFAULT_DAILY_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
/// Genre seeding the stored artist pool.
const DEFAULT_POOL_GENRE: &str = "pop";
/// Target size of the stored artist pool.
const DEFAULT_POOL_SIZE: usize = 50;

/// Connection settings for the external music catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// OAuth token endpoint used for the client-credentials exchange.
    pub token_url: String,
    /// Catalog API base URL, without a trailing slash.
    pub api_base: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Catalog connection settings.
    pub catalog: CatalogConfig,
    /// Interval between idle-room reclaim sweeps.
    pub sweep_interval: Duration,
    /// Inactivity threshold after which a room is reclaimed.
    pub idle_threshold: Duration,
    /// Interval between artist pool and daily challenge refreshes.
    pub daily_refresh_interval: Duration,
    /// Genre the artist pool is drawn from.
    pub pool_genre: String,
    /// Number of artists kept in the pool.
    pub pool_size: usize,
}

impl AppConfig {
    /// Load the configuration from environment variables, falling back to
    /// defaults for everything except the catalog credentials.
    pub fn load() -> Self {
        Self {
            port: env_parsed("PORT", DEFAULT_PORT),
            catalog: CatalogConfig {
                token_url: env_or("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL),
                api_base: env_or("SPOTIFY_API_BASE", DEFAULT_API_BASE),
                client_id: env::var("SPOTIFY_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("SPOTIFY_CLIENT_SECRET").unwrap_or_default(),
            },
            sweep_interval: env_secs("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL),
            idle_threshold: env_secs("IDLE_THRESHOLD_SECS", DEFAULT_IDLE_THRESHOLD),
            daily_refresh_interval: env_secs(
                "DAILY_REFRESH_INTERVAL_SECS",
                DEFAULT_DAILY_REFRESH_INTERVAL,
            ),
            pool_genre: env_or("ARTIST_POOL_GENRE", DEFAULT_POOL_GENRE),
            pool_size: env_parsed("ARTIST_POOL_SIZE", DEFAULT_POOL_SIZE),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            catalog: CatalogConfig {
                token_url: DEFAULT_TOKEN_URL.to_string(),
                api_base: DEFAULT_API_BASE.to_string(),
                client_id: String::new(),
                client_secret: String::new(),
            },
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            daily_refresh_interval: DEFAULT_DAILY_REFRESH_INTERVAL,
            pool_genre: DEFAULT_POOL_GENRE.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_secs(var: &str, default: Duration) -> Duration {
    env::var(var)
        .ok()
        .and_then(|value| value.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
