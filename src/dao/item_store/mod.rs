/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::str::FromStr;

use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::{ItemEntity, ItemFields};
use crate::dao::storage::StorageResult;

/// Environment variable selecting the storage backend.
pub const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";
/// Database name used by every backend when none is configured.
pub const DEFAULT_DATABASE: &str = "videogames";

/// Value of the environment variable `name`, or `default` when it is unset or blank.
pub(crate) fn env_or(name: &str, default: &str) -> String {
    non_blank_or(std::env::var(name).ok(), default)
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// Abstraction over the persistent collection of catalog items.
pub trait ItemStore: Send + Sync {
    /// Every stored item, in the store's native order.
    fn list_items(&self) -> BoxFuture<'static, StorageResult<Vec<ItemEntity>>>;
    /// Persist a new item under a freshly assigned identifier.
    fn create_item(&self, fields: ItemFields) -> BoxFuture<'static, StorageResult<ItemEntity>>;
    /// Replace every field of the item `id` and hand back the record as it was before;
    /// `None` when no such item exists.
    fn update_item(
        &self,
        id: Uuid,
        fields: ItemFields,
    ) -> BoxFuture<'static, StorageResult<Option<ItemEntity>>>;
    /// Remove the item `id` and hand it back; `None` when no such item exists.
    fn delete_item(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ItemEntity>>>;
    /// Number of stored items.
    fn count_items(&self) -> BoxFuture<'static, StorageResult<u64>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Storage backends the binary can be started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// MongoDB collection (`MONGO_URI`, `MONGO_DB`).
    #[cfg(feature = "mongo-store")]
    Mongo,
    /// CouchDB database (`COUCH_BASE_URL`, `COUCH_DB`, optional credentials).
    #[cfg(feature = "couch-store")]
    Couch,
    /// In-process store, lost on restart.
    Memory,
}

/// Value of [`STORAGE_BACKEND_ENV`] that names no compiled-in backend.
#[derive(Debug, Error)]
#[error("unknown storage backend `{0}` (expected mongo, couch or memory)")]
pub struct UnknownBackend(pub String);

impl StorageBackend {
    /// Read the backend from [`STORAGE_BACKEND_ENV`], defaulting to the first compiled-in database.
    pub fn from_env() -> Result<Self, UnknownBackend> {
        match std::env::var(STORAGE_BACKEND_ENV) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Self::default()),
        }
    }
}

impl Default for StorageBackend {
    #[allow(unreachable_code)]
    fn default() -> Self {
        #[cfg(feature = "mongo-store")]
        return StorageBackend::Mongo;
        #[cfg(feature = "couch-store")]
        return StorageBackend::Couch;
        StorageBackend::Memory
    }
}

impl FromStr for StorageBackend {
    type Err = UnknownBackend;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            #[cfg(feature = "mongo-store")]
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            #[cfg(feature = "couch-store")]
            "couch" | "couchdb" => Ok(StorageBackend::Couch),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(UnknownBackend(value.to_owned())),
        }
    }
}
