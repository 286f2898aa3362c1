//! Shared application state handed to every handler and background task.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::{info, warn};

use crate::{
    catalog::{CatalogApi, discography::Discography},
    config::AppConfig,
    dao::room_store::RoomStore,
    error::ServiceError,
    rooms::RoomService,
};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Global state: configuration, the catalog client and the (possibly absent)
/// room store. The store slot is empty while storage is down; requests that
/// need it fail fast with [`ServiceError::Degraded`].
pub struct AppState {
    /// Runtime configuration.
    pub config: AppConfig,
    catalog: Arc<dyn CatalogApi>,
    room_store: RwLock<Option<Arc<dyn RoomStore>>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Build the state with no store installed yet; the storage supervisor
    /// fills the slot once a backend connects.
    pub fn new(config: AppConfig, catalog: Arc<dyn CatalogApi>) -> SharedState {
        let (degraded, _) = watch::channel(true);
        Arc::new(Self {
            config,
            catalog,
            room_store: RwLock::new(None),
            degraded,
        })
    }

    /// The installed room store, or [`ServiceError::Degraded`] when storage
    /// is down.
    pub async fn require_room_store(&self) -> Result<Arc<dyn RoomStore>, ServiceError> {
        self.room_store
            .read()
            .await
            .clone()
            .ok_or(ServiceError::Degraded)
    }

    /// A [`RoomService`] over the installed store.
    pub async fn room_service(&self) -> Result<RoomService, ServiceError> {
        Ok(RoomService::new(self.require_room_store().await?))
    }

    /// Catalog discography facade.
    pub fn discography(&self) -> Discography {
        Discography::new(self.catalog.clone())
    }

    /// Raw catalog handle.
    pub fn catalog(&self) -> Arc<dyn CatalogApi> {
        self.catalog.clone()
    }

    /// Install a connected store and clear the degraded flag.
    pub async fn install_room_store(&self, store: Arc<dyn RoomStore>) {
        *self.room_store.write().await = Some(store);
        self.update_degraded(false);
        info!("room store installed");
    }

    /// Drop the store and mark the application degraded.
    pub async fn clear_room_store(&self) {
        self.room_store.write().await.take();
        self.update_degraded(true);
        warn!("room store cleared, running degraded");
    }

    /// Whether the application currently lacks a storage backend.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    fn update_degraded(&self, degraded: bool) {
        self.degraded.send_if_modified(|current| {
            if *current != degraded {
                *current = degraded;
                true
            } else {
                false
            }
        });
    }
}
