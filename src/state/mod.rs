use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{image_store::ImageStore, item_store::ItemStore},
    error::ServiceError,
};

/// Handle to [`AppState`] shared by handlers and background tasks.
pub type SharedState = Arc<AppState>;

/// Central application state storing the store handle and static configuration.
pub struct AppState {
    item_store: RwLock<Option<Arc<dyn ItemStore>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    images: ImageStore,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let images = ImageStore::new(config.uploads_dir().clone());
        Arc::new(Self {
            item_store: RwLock::new(None),
            degraded: degraded_tx,
            config,
            images,
        })
    }

    /// Construct a state with `store` already installed.
    pub fn with_item_store(config: AppConfig, store: Arc<dyn ItemStore>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        let images = ImageStore::new(config.uploads_dir().clone());
        Arc::new(Self {
            item_store: RwLock::new(Some(store)),
            degraded: degraded_tx,
            config,
            images,
        })
    }

    /// Obtain a handle to the current item store, if one is installed.
    pub async fn item_store(&self) -> Option<Arc<dyn ItemStore>> {
        let guard = self.item_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current item store or fail with [`ServiceError::Degraded`].
    pub async fn require_item_store(&self) -> Result<Arc<dyn ItemStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.item_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new item store implementation and leave degraded mode.
    pub async fn install_item_store(&self, store: Arc<dyn ItemStore>) {
        {
            let mut guard = self.item_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current item store and enter degraded mode.
    pub async fn clear_item_store(&self) {
        {
            let mut guard = self.item_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag, notifying watchers only when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Disk store for uploaded item images.
    pub fn images(&self) -> &ImageStore {
        &self.images
    }
}
