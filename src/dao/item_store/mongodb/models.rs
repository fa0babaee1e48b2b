use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{ImageRef, ItemEntity, ItemFields};

use super::error::{MongoDaoError, MongoResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoItemDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    genre: String,
    release_year: i32,
    platform: String,
    #[serde(default)]
    characters: Vec<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    trailer_url: Option<String>,
    #[serde(default)]
    image: ImageRef,
}

impl From<ItemEntity> for MongoItemDocument {
    fn from(value: ItemEntity) -> Self {
        let ItemFields {
            title,
            genre,
            release_year,
            platform,
            characters,
            description,
            trailer_url,
            image,
        } = value.fields;

        Self {
            id: value.id.to_string(),
            title,
            genre,
            release_year,
            platform,
            characters,
            description,
            trailer_url,
            image,
        }
    }
}

impl TryFrom<MongoItemDocument> for ItemEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoItemDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id).map_err(|source| MongoDaoError::MalformedId {
            id: value.id.clone(),
            source,
        })?;

        Ok(Self {
            id,
            fields: ItemFields {
                title: value.title,
                genre: value.genre,
                release_year: value.release_year,
                platform: value.platform,
                characters: value.characters,
                description: value.description,
                trailer_url: value.trailer_url,
                image: value.image,
            },
        })
    }
}

/// Filter matching the catalog document of `id`.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

/// Filter matching documents written by this store; other writers use ObjectId keys.
pub fn catalog_documents() -> Document {
    doc! {"_id": {"$type": "string"}}
}

/// Decode one raw collection row into an entity.
pub fn decode_item(document: Document) -> MongoResult<ItemEntity> {
    let id = document
        .get("_id")
        .map(ToString::to_string)
        .unwrap_or_else(|| "<no _id>".to_owned());
    let parsed: MongoItemDocument = mongodb::bson::deserialize_from_document(document)
        .map_err(|err| MongoDaoError::DecodeItem {
            id,
            reason: err.to_string(),
        })?;
    ItemEntity::try_from(parsed)
}
