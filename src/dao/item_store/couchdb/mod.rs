mod config;
mod error;
mod models;
/// [`CouchItemStore`] implementation.
pub mod store;

pub use config::CouchConfig;
pub use error::CouchDaoError;
pub use store::CouchItemStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        if err.is_write() {
            StorageError::write(err.to_string(), err)
        } else {
            StorageError::unavailable(err.to_string(), err)
        }
    }
}
