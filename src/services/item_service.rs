use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        item_store::ItemStore,
        models::{ImageRef, ItemEntity, ItemFields},
        storage::StorageResult,
    },
    dto::item::{GameItem, ItemInput, UploadedImage},
    error::ServiceError,
    state::SharedState,
};

/// Return every catalog item in store order.
pub async fn list_items(state: &SharedState) -> Result<Vec<GameItem>, ServiceError> {
    let store = state.require_item_store().await?;
    let items = store.list_items().await?;
    Ok(items.into_iter().map(Into::into).collect())
}

/// Validate `input`, store the optional image and persist a new item.
///
/// Nothing is written, neither file nor record, when validation fails.
pub async fn create_item(
    state: &SharedState,
    input: ItemInput,
    image: Option<UploadedImage>,
) -> Result<GameItem, ServiceError> {
    let draft = input.into_draft()?;
    let store = state.require_item_store().await?;

    let stored_image = store_upload(state, image.as_ref()).await?;
    match store.create_item(draft.into_fields(stored_image.clone())).await {
        Ok(entity) => {
            info!(id = %entity.id, title = %entity.fields.title, "item created");
            Ok(entity.into())
        }
        Err(err) => {
            discard_upload(state, stored_image.as_deref()).await;
            Err(err.into())
        }
    }
}

/// Replace every field of the item identified by `raw_id`.
pub async fn update_item(
    state: &SharedState,
    raw_id: &str,
    input: ItemInput,
    image: Option<UploadedImage>,
) -> Result<GameItem, ServiceError> {
    let draft = input.into_draft()?;
    let id = parse_item_id(raw_id)?;
    let store = state.require_item_store().await?;

    let stored_image = store_upload(state, image.as_ref()).await?;
    let fields = draft.into_fields(stored_image.clone());
    match store.update_item(id, fields.clone()).await {
        Ok(Some(previous)) => {
            info!(%id, "item updated");
            let replaced = previous.fields.image.stored_path();
            if replaced != fields.image.stored_path() {
                discard_upload(state, replaced).await;
            }
            Ok(ItemEntity { id, fields }.into())
        }
        Ok(None) => {
            discard_upload(state, stored_image.as_deref()).await;
            Err(item_not_found(raw_id))
        }
        Err(err) => {
            discard_upload(state, stored_image.as_deref()).await;
            Err(err.into())
        }
    }
}

/// Hard-delete the item identified by `raw_id` and return it.
pub async fn delete_item(state: &SharedState, raw_id: &str) -> Result<GameItem, ServiceError> {
    let id = parse_item_id(raw_id)?;
    let store = state.require_item_store().await?;

    let Some(entity) = store.delete_item(id).await? else {
        return Err(item_not_found(raw_id));
    };

    info!(id = %entity.id, "item deleted");
    discard_upload(state, entity.fields.image.stored_path()).await;
    Ok(entity.into())
}

/// Insert the default catalog item when the collection is empty.
///
/// Returns the created item, or `None` when the collection already had content.
pub async fn seed_default_item(store: &dyn ItemStore) -> StorageResult<Option<ItemEntity>> {
    if store.count_items().await? > 0 {
        return Ok(None);
    }
    store.create_item(default_item_fields()).await.map(Some)
}

/// Record inserted into an empty catalog.
pub fn default_item_fields() -> ItemFields {
    ItemFields {
        title: "The Last of Us".into(),
        genre: "Action".into(),
        release_year: 2013,
        platform: "Console".into(),
        characters: vec!["Joel Miller".into(), "Ellie Williams".into()],
        description: None,
        trailer_url: None,
        image: ImageRef::Placeholder,
    }
}

/// Unparseable identifiers cannot match any record, so they are reported as missing.
fn parse_item_id(raw_id: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw_id.trim()).map_err(|_| item_not_found(raw_id))
}

fn item_not_found(raw_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("item `{raw_id}` not found"))
}

async fn store_upload(
    state: &SharedState,
    image: Option<&UploadedImage>,
) -> Result<Option<String>, ServiceError> {
    match image {
        Some(image) => Ok(Some(state.images().save(image).await?)),
        None => Ok(None),
    }
}

async fn discard_upload(state: &SharedState, public_path: Option<&str>) {
    let Some(path) = public_path else {
        return;
    };
    if let Err(err) = state.images().remove(path).await {
        warn!(error = %err, path, "failed to remove uploaded image");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Bytes;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{item_store::memory::MemoryItemStore, models::PLACEHOLDER_IMAGE_PATH},
        dto::item::ReleaseYearInput,
        state::AppState,
    };

    fn state_with(store: &MemoryItemStore) -> SharedState {
        AppState::with_item_store(AppConfig::default(), Arc::new(store.clone()))
    }

    fn hades() -> ItemInput {
        ItemInput {
            title: Some("Hades".into()),
            genre: Some("Action".into()),
            release_year: Some(ReleaseYearInput::Integer(2020)),
            platform: Some("PC".into()),
            characters: Some(vec!["Zagreus".into(), "Hades".into()]),
            ..ItemInput::default()
        }
    }

    #[tokio::test]
    async fn create_then_list_contains_item_with_placeholder() {
        let store = MemoryItemStore::new();
        let state = state_with(&store);

        let created = create_item(&state, hades(), None).await.unwrap();
        let listed = list_items(&state).await.unwrap();

        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(created.image_ref, PLACEHOLDER_IMAGE_PATH);
        assert_eq!(created.characters, vec!["Zagreus", "Hades"]);
    }

    #[tokio::test]
    async fn external_image_url_is_kept() {
        let store = MemoryItemStore::new();
        let state = state_with(&store);
        let input = ItemInput {
            image_url: Some("https://example.com/hades.png".into()),
            ..hades()
        };

        let created = create_item(&state, input, None).await.unwrap();
        assert_eq!(created.image_ref, "https://example.com/hades.png");
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let store = MemoryItemStore::new();
        let state = state_with(&store);
        let input = ItemInput {
            title: Some("   ".into()),
            ..hades()
        };

        let err = create_item(&state, input, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(store.count_items().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids_are_not_found() {
        let store = MemoryItemStore::new();
        let state = state_with(&store);

        let err = update_item(&state, "000", hades(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let missing = Uuid::new_v4().to_string();
        let err = delete_item(&state, &missing).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_is_a_full_replacement() {
        let store = MemoryItemStore::new();
        let state = state_with(&store);
        let created = create_item(
            &state,
            ItemInput {
                description: Some("Roguelike".into()),
                trailer_url: Some("https://example.com/trailer".into()),
                ..hades()
            },
            None,
        )
        .await
        .unwrap();

        let replacement = ItemInput {
            title: Some("Hades II".into()),
            release_year: Some(ReleaseYearInput::Integer(2024)),
            characters: Some(vec!["Melinoë".into()]),
            ..hades()
        };
        let updated = update_item(&state, &created.id, replacement, None)
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Hades II");
        assert_eq!(updated.release_year, 2024);
        assert_eq!(updated.characters, vec!["Melinoë"]);
        assert_eq!(updated.description, None);
        assert_eq!(updated.trailer_url, None);
        assert_eq!(list_items(&state).await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn replacing_an_uploaded_image_removes_the_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryItemStore::new();
        let state = AppState::with_item_store(
            AppConfig::default().with_uploads_dir(dir.path()),
            Arc::new(store.clone()),
        );
        let cover = UploadedImage {
            file_name: Some("cover.png".into()),
            content_type: Some("image/png".into()),
            bytes: Bytes::from_static(b"png"),
        };
        let on_disk = |image_ref: &str| dir.path().join(image_ref.trim_start_matches("/uploads/"));

        let created = create_item(&state, hades(), Some(cover.clone()))
            .await
            .unwrap();
        let first = on_disk(&created.image_ref);
        assert!(first.exists());

        let updated = update_item(&state, &created.id, hades(), Some(cover))
            .await
            .unwrap();
        let second = on_disk(&updated.image_ref);
        assert!(!first.exists());
        assert!(second.exists());

        let updated = update_item(&state, &created.id, hades(), None).await.unwrap();
        assert_eq!(updated.image_ref, PLACEHOLDER_IMAGE_PATH);
        assert!(!second.exists());
    }

    #[tokio::test]
    async fn delete_twice_yields_success_then_not_found() {
        let store = MemoryItemStore::new();
        let state = state_with(&store);
        let created = create_item(&state, hades(), None).await.unwrap();

        let removed = delete_item(&state, &created.id).await.unwrap();
        assert_eq!(removed, created);

        let err = delete_item(&state, &created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn degraded_state_rejects_requests() {
        let state = AppState::new(AppConfig::default());
        let err = list_items(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }

    #[tokio::test]
    async fn seed_only_runs_on_empty_collection() {
        let store = MemoryItemStore::new();

        let seeded = seed_default_item(&store).await.unwrap();
        assert_eq!(
            seeded.map(|entity| entity.fields),
            Some(default_item_fields())
        );
        assert!(seed_default_item(&store).await.unwrap().is_none());
        assert_eq!(store.count_items().await.unwrap(), 1);
    }
}
