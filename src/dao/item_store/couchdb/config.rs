use crate::dao::item_store::{DEFAULT_DATABASE, env_or};

/// Server used when `COUCH_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5984";

/// Location of the CouchDB catalog database and the credentials to reach it.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server root without a trailing slash.
    pub base_url: String,
    /// Database holding the `item::<uuid>` documents.
    pub database: String,
    /// Basic-auth user and password, when both are configured.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    /// Resolve `COUCH_BASE_URL`/`COUCH_DB` with the same fallbacks as the MongoDB backend,
    /// plus the optional `COUCH_USERNAME`/`COUCH_PASSWORD` pair.
    pub fn from_env() -> Self {
        let credentials = std::env::var("COUCH_USERNAME")
            .ok()
            .zip(std::env::var("COUCH_PASSWORD").ok());
        Self::new(
            &env_or("COUCH_BASE_URL", DEFAULT_BASE_URL),
            &env_or("COUCH_DB", DEFAULT_DATABASE),
            credentials,
        )
    }

    fn new(base_url: &str, database: &str, credentials: Option<(String, String)>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            database: database.to_owned(),
            credentials,
        }
    }
}
