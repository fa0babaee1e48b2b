use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image served for items that were stored without an upload or external URL.
pub const PLACEHOLDER_IMAGE_PATH: &str = "/uploads/placeholder-image.jpg";

/// Reference to the image displayed next to a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageRef {
    /// Public path of a file written by the image store (e.g. `/uploads/<name>`).
    Stored(String),
    /// URL supplied by the caller and hosted elsewhere.
    External(String),
    /// No image supplied; rendered as [`PLACEHOLDER_IMAGE_PATH`].
    #[default]
    Placeholder,
}

impl ImageRef {
    /// Pick the image reference for a write: an uploaded file wins over an external URL,
    /// and the placeholder is used when neither is present.
    pub fn resolve(stored_path: Option<String>, external_url: Option<String>) -> Self {
        match (stored_path, external_url) {
            (Some(path), _) => ImageRef::Stored(path),
            (None, Some(url)) => ImageRef::External(url),
            (None, None) => ImageRef::Placeholder,
        }
    }

    /// Path or URL a client should use to display the image.
    pub fn display_path(&self) -> &str {
        match self {
            ImageRef::Stored(path) => path,
            ImageRef::External(url) => url,
            ImageRef::Placeholder => PLACEHOLDER_IMAGE_PATH,
        }
    }

    /// Public path of the uploaded file, if this reference owns one.
    pub fn stored_path(&self) -> Option<&str> {
        match self {
            ImageRef::Stored(path) => Some(path),
            _ => None,
        }
    }
}

/// Validated, mutable content of a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    /// Game title.
    pub title: String,
    /// Game genre (e.g. "Action").
    pub genre: String,
    /// Year the game was released.
    pub release_year: i32,
    /// Platform the game runs on.
    pub platform: String,
    /// Featured characters in display order.
    pub characters: Vec<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Link to a trailer video.
    #[serde(default)]
    pub trailer_url: Option<String>,
    /// Image shown for the item.
    #[serde(default)]
    pub image: ImageRef,
}

/// Catalog item persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntity {
    /// Identifier assigned on creation; never changes afterwards.
    pub id: Uuid,
    /// Current field values.
    pub fields: ItemFields,
}

impl ItemEntity {
    /// Build a brand-new entity with a freshly generated identifier.
    pub fn create(fields: ItemFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
        }
    }
}
