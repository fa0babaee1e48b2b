use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dao::{
    item_store::couchdb::error::CouchDaoError,
    models::{ItemEntity, ItemFields},
};

pub const ITEM_PREFIX: &str = "item::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchItemDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub item: ItemFields,
}

impl CouchItemDocument {
    pub fn from_entity(entity: ItemEntity, rev: Option<String>) -> Self {
        Self {
            id: item_doc_id(entity.id),
            rev,
            item: entity.fields,
        }
    }

    pub fn into_entity(self) -> Result<ItemEntity, CouchDaoError> {
        let id = parse_item_doc_id(&self.id)?;
        Ok(ItemEntity {
            id,
            fields: self.item,
        })
    }
}

pub fn item_doc_id(id: Uuid) -> String {
    format!("{ITEM_PREFIX}{id}")
}

pub fn parse_item_doc_id(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let raw = doc_id
        .strip_prefix(ITEM_PREFIX)
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_owned(),
            kind: "missing item prefix",
        })?;

    Uuid::parse_str(raw).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_owned(),
        kind: "malformed uuid",
    })
}
