use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database,
    bson::{Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{MongoItemDocument, catalog_documents, decode_item, doc_id},
};
use crate::dao::{
    item_store::ItemStore,
    models::{ItemEntity, ItemFields},
    storage::StorageResult,
};

const ITEM_COLLECTION_NAME: &str = "videogames";

/// MongoDB-backed [`ItemStore`] implementation.
#[derive(Clone)]
pub struct MongoItemStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database = self.config.connect_database().await?;
        self.state.write().await.database = database;
        Ok(())
    }
}

impl MongoItemStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = config.connect_database().await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"title": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("item_title_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ITEM_COLLECTION_NAME,
                index: "title",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoItemDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoItemDocument>(ITEM_COLLECTION_NAME)
    }

    async fn raw_collection(&self) -> Collection<Document> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<Document>(ITEM_COLLECTION_NAME)
    }

    /// Rows that do not decode (e.g. written by another tool) are logged and skipped.
    async fn list_items(&self) -> MongoResult<Vec<ItemEntity>> {
        let documents: Vec<Document> = self
            .raw_collection()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListItems { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListItems { source })?;

        let mut items = Vec::with_capacity(documents.len());
        for document in documents {
            match decode_item(document) {
                Ok(entity) => items.push(entity),
                Err(err) => warn!(error = %err, "skipping undecodable item document"),
            }
        }
        Ok(items)
    }

    async fn create_item(&self, fields: ItemFields) -> MongoResult<ItemEntity> {
        let entity = ItemEntity::create(fields);
        let id = entity.id;
        let document: MongoItemDocument = entity.clone().into();

        self.collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertItem { id, source })?;

        Ok(entity)
    }

    async fn update_item(&self, id: Uuid, fields: ItemFields) -> MongoResult<Option<ItemEntity>> {
        let document: MongoItemDocument = ItemEntity { id, fields }.into();

        let previous = self
            .collection()
            .await
            .find_one_and_replace(doc_id(id), &document)
            .return_document(ReturnDocument::Before)
            .await
            .map_err(|source| MongoDaoError::ReplaceItem { id, source })?;

        previous.map(ItemEntity::try_from).transpose()
    }

    async fn delete_item(&self, id: Uuid) -> MongoResult<Option<ItemEntity>> {
        let removed = self
            .collection()
            .await
            .find_one_and_delete(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteItem { id, source })?;

        removed.map(ItemEntity::try_from).transpose()
    }

    async fn count_items(&self) -> MongoResult<u64> {
        self.collection()
            .await
            .count_documents(catalog_documents())
            .await
            .map_err(|source| MongoDaoError::CountItems { source })
    }
}

impl ItemStore for MongoItemStore {
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
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
