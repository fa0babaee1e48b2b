use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB store operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures raised by the MongoDB backend, keyed by the operation that failed.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to list items")]
    ListItems {
        #[source]
        source: MongoError,
    },
    #[error("failed to count items")]
    CountItems {
        #[source]
        source: MongoError,
    },
    #[error("failed to insert item `{id}`")]
    InsertItem {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to replace item `{id}`")]
    ReplaceItem {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete item `{id}`")]
    DeleteItem {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("item document {id} could not be decoded: {reason}")]
    DecodeItem { id: String, reason: String },
    #[error("stored item document `{id}` has a malformed identifier")]
    MalformedId {
        id: String,
        #[source]
        source: uuid::Error,
    },
}

impl MongoDaoError {
    /// Whether the failure happened while mutating the collection.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            MongoDaoError::InsertItem { .. }
                | MongoDaoError::ReplaceItem { .. }
                | MongoDaoError::DeleteItem { .. }
        )
    }
}
