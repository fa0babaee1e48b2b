use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::debug;
use uuid::Uuid;

use crate::dao::{
    item_store::ItemStore,
    models::{ItemEntity, ItemFields},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{AllDocsResponse, CouchItemDocument, END_SUFFIX, ITEM_PREFIX, item_doc_id},
};

const ALL_DOCS: &str = "_all_docs";

/// CouchDB-backed [`ItemStore`] implementation; every item is one `item::<uuid>` document.
#[derive(Clone)]
pub struct CouchItemStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchItemStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url);
        let database = Arc::<str>::from(config.database);
        let auth = config
            .credentials
            .map(|(user, password)| (Arc::<str>::from(user), Arc::<str>::from(password)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        self.authorize(self.client.request(method, url))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .authorize(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::WriteStatus {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn delete_document(&self, doc_id: &str, rev: &str) -> CouchResult<()> {
        let response = self
            .request(Method::DELETE, doc_id)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::WriteStatus {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn all_docs(&self, include_docs: bool) -> CouchResult<AllDocsResponse> {
        let query = [
            ("include_docs", include_docs.to_string()),
            ("startkey", format!("\"{}\"", ITEM_PREFIX)),
            ("endkey", format!("\"{}{}\"", ITEM_PREFIX, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<AllDocsResponse>()
            .await
            .map_err(|source| CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            })
    }

    async fn list_items(&self) -> CouchResult<Vec<ItemEntity>> {
        let payload = self.all_docs(true).await?;

        let mut items = Vec::with_capacity(payload.rows.len());
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed: CouchItemDocument =
                    from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                        path: row.id.clone(),
                        source,
                    })?;
                items.push(parsed.into_entity()?);
            }
        }

        Ok(items)
    }

    async fn create_item(&self, fields: ItemFields) -> CouchResult<ItemEntity> {
        let entity = ItemEntity::create(fields);
        let doc_id = item_doc_id(entity.id);
        let document = CouchItemDocument::from_entity(entity.clone(), None);
        self.put_document(&doc_id, &document).await?;
        Ok(entity)
    }

    /// Last write wins: a revision conflict re-reads the document and retries once.
    async fn update_item(&self, id: Uuid, fields: ItemFields) -> CouchResult<Option<ItemEntity>> {
        let doc_id = item_doc_id(id);
        let entity = ItemEntity { id, fields };
        let mut retried = false;

        loop {
            let Some(existing) = self.get_document::<CouchItemDocument>(&doc_id).await? else {
                return Ok(None);
            };

            let document = CouchItemDocument::from_entity(entity.clone(), existing.rev.clone());
            match self.put_document(&doc_id, &document).await {
                Ok(()) => return existing.into_entity().map(Some),
                Err(err) if err.is_conflict() && !retried => {
                    debug!(doc_id = %doc_id, "revision conflict; retrying with the latest revision");
                    retried = true;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn delete_item(&self, id: Uuid) -> CouchResult<Option<ItemEntity>> {
        let doc_id = item_doc_id(id);
        let Some(existing) = self.get_document::<CouchItemDocument>(&doc_id).await? else {
            return Ok(None);
        };

        let rev = existing
            .rev
            .clone()
            .ok_or_else(|| CouchDaoError::MissingRevision {
                doc_id: doc_id.clone(),
            })?;
        self.delete_document(&doc_id, &rev).await?;
        existing.into_entity().map(Some)
    }

    async fn count_items(&self) -> CouchResult<u64> {
        let payload = self.all_docs(false).await?;
        Ok(payload
            .rows
            .iter()
            .filter(|row| row.id.starts_with(ITEM_PREFIX))
            .count() as u64)
    }

    async fn health_check(&self) -> CouchResult<()> {
        let url = self.database_url();
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: url.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: url,
                status: response.status(),
            })
        }
    }
}

impl ItemStore for CouchItemStore {
    fn list_items(&self) -> BoxFuture<'static, StorageResult<Vec<ItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_items().await.map_err(Into::into) })
    }

    fn create_item(&self, fields: ItemFields) -> BoxFuture<'static, StorageResult<ItemEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_item(fields).await.map_err(Into::into) })
    }

    fn update_item(
        &self,
        id: Uuid,
        fields: ItemFields,
    ) -> BoxFuture<'static, StorageResult<Option<ItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_item(id, fields).await.map_err(Into::into) })
    }

    fn delete_item(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.delete_item(id).await.map_err(Into::into) })
    }

    fn count_items(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_items().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.health_check().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
