//! Tracklink backend binary entrypoint wiring the REST, catalog and CouchDB layers.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracklink_back::{
    catalog::{auth::TokenProvider, client::SpotifyClient},
    config::AppConfig,
    dao::{
        couchdb::{CouchConfig, CouchRoomStore},
        memory::MemoryRoomStore,
        room_store::RoomStore,
        storage::StorageError,
    },
    routes,
    services::{scheduler, storage_supervisor},
    state::{AppState, SharedState},
};

/// Rooms seeded into the in-memory fallback store.
const DEFAULT_ROOMS: &[&str] = &["lobby", "arena", "studio"];

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    if config.catalog.client_id.is_empty() || config.catalog.client_secret.is_empty() {
        warn!("catalog credentials are not configured; catalog requests will be rejected");
    }

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("building HTTP client")?;

    let tokens = Arc::new(TokenProvider::new(http.clone(), &config.catalog));
    let catalog = Arc::new(SpotifyClient::new(http, &config.catalog.api_base, tokens));

    let port = config.port;
    let state = AppState::new(config, catalog);

    spawn_storage(state.clone()).await;
    tokio::spawn(scheduler::run_reclaim_sweep(state.clone()));
    tokio::spawn(scheduler::run_daily_refresh(state.clone()));

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install a storage backend: a supervised CouchDB connection when one is
/// configured, otherwise a seeded in-memory store for local runs.
async fn spawn_storage(state: SharedState) {
    match CouchConfig::from_env() {
        Ok(config) => {
            tokio::spawn(storage_supervisor::run(state, move || {
                let config = config.clone();
                async move {
                    let store = CouchRoomStore::connect(config)
                        .await
                        .map_err(StorageError::from)?;
                    Ok(Arc::new(store) as Arc<dyn RoomStore>)
                }
            }));
        }
        Err(err) => {
            warn!(error = %err, "CouchDB not configured; using in-memory store");
            let store = Arc::new(MemoryRoomStore::with_rooms(DEFAULT_ROOMS));
            state.install_room_store(store).await;
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
