//! In-process [`ItemStore`] used for tests and database-less runs.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    item_store::ItemStore,
    models::{ItemEntity, ItemFields},
    storage::StorageResult,
};

/// Items kept in insertion order behind an async lock.
#[derive(Clone, Default)]
pub struct MemoryItemStore {
    items: Arc<RwLock<IndexMap<Uuid, ItemEntity>>>,
}

impl MemoryItemStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemStore for MemoryItemStore {
    fn list_items(&self) -> BoxFuture<'static, StorageResult<Vec<ItemEntity>>> {
        let items = self.items.clone();
        Box::pin(async move { Ok(items.read().await.values().cloned().collect()) })
    }

    fn create_item(&self, fields: ItemFields) -> BoxFuture<'static, StorageResult<ItemEntity>> {
        let items = self.items.clone();
        Box::pin(async move {
            let entity = ItemEntity::create(fields);
            items.write().await.insert(entity.id, entity.clone());
            Ok(entity)
        })
    }

    fn update_item(
        &self,
        id: Uuid,
        fields: ItemFields,
    ) -> BoxFuture<'static, StorageResult<Option<ItemEntity>>> {
        let items = self.items.clone();
        Box::pin(async move {
            let mut guard = items.write().await;
            let Some(entity) = guard.get_mut(&id) else {
                return Ok(None);
            };
            let previous = std::mem::replace(&mut entity.fields, fields);
            Ok(Some(ItemEntity { id, fields: previous }))
        })
    }

    fn delete_item(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ItemEntity>>> {
        let items = self.items.clone();
        Box::pin(async move { Ok(items.write().await.shift_remove(&id)) })
    }

    fn count_items(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let items = self.items.clone();
        Box::pin(async move { Ok(items.read().await.len() as u64) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::ImageRef;

    fn fields(title: &str) -> ItemFields {
        ItemFields {
            title: title.into(),
            genre: "Action".into(),
            release_year: 2020,
            platform: "PC".into(),
            characters: vec!["Zagreus".into(), "Hades".into()],
            description: None,
            trailer_url: None,
            image: ImageRef::Placeholder,
        }
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let store = MemoryItemStore::new();
        let first = store.create_item(fields("Hades")).await.unwrap();
        let second = store.create_item(fields("Celeste")).await.unwrap();

        let listed = store.list_items().await.unwrap();
        assert_eq!(
            listed.iter().map(|item| item.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[tokio::test]
    async fn update_replaces_all_fields_and_returns_previous() {
        let store = MemoryItemStore::new();
        let created = store.create_item(fields("Hades")).await.unwrap();

        let mut replacement = fields("Hades II");
        replacement.characters = Vec::new();
        replacement.description = Some("Sequel".into());

        let previous = store
            .update_item(created.id, replacement.clone())
            .await
            .unwrap()
            .expect("item exists");
        assert_eq!(previous, created);

        let listed = store.list_items().await.unwrap();
        assert_eq!(
            listed,
            vec![ItemEntity {
                id: created.id,
                fields: replacement
            }]
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_reported_as_missing() {
        let store = MemoryItemStore::new();
        let id = Uuid::new_v4();
        assert!(store.update_item(id, fields("Hades")).await.unwrap().is_none());
        assert!(store.delete_item(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_twice_returns_item_then_none() {
        let store = MemoryItemStore::new();
        let created = store.create_item(fields("Hades")).await.unwrap();

        let removed = store.delete_item(created.id).await.unwrap();
        assert_eq!(removed, Some(created.clone()));
        assert!(store.delete_item(created.id).await.unwrap().is_none());
        assert_eq!(store.count_items().await.unwrap(), 0);
    }
}
