use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::item_store::{DEFAULT_DATABASE, env_or};

/// Connection string used when `MONGO_URI` is not set.
pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

const CONNECT_ATTEMPTS: u32 = 10;
const FIRST_RETRY_DELAY: Duration = Duration::from_millis(250);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Parsed client options plus the database holding the catalog collection.
#[derive(Clone)]
pub struct MongoConfig {
    /// Driver options parsed from the connection string.
    pub options: ClientOptions,
    /// Database holding the catalog collection.
    pub database_name: String,
}

impl MongoConfig {
    /// Parse `uri` and target `database_name`.
    pub async fn from_uri(uri: &str, database_name: &str) -> MongoResult<Self> {
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name: database_name.to_owned(),
        })
    }

    /// Resolve `MONGO_URI`/`MONGO_DB`, falling back to a local server and the default database.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = env_or("MONGO_URI", DEFAULT_URI);
        Self::from_uri(&uri, &env_or("MONGO_DB", DEFAULT_DATABASE)).await
    }

    /// Open a client and wait, with backoff, until the server answers a ping.
    pub async fn connect_database(&self) -> MongoResult<Database> {
        let client = Client::with_options(self.options.clone())
            .map_err(|source| MongoDaoError::ClientConstruction { source })?;
        let database = client.database(&self.database_name);

        let mut attempt = 0;
        let mut delay = FIRST_RETRY_DELAY;
        loop {
            attempt += 1;
            match database.run_command(doc! { "ping": 1 }).await {
                Ok(_) => return Ok(database),
                Err(source) if attempt >= CONNECT_ATTEMPTS => {
                    return Err(MongoDaoError::InitialPing {
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => {
                    debug!(attempt, error = %err, "MongoDB not reachable yet");
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY);
                }
            }
        }
    }
}
