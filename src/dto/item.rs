use std::fmt;

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::dao::models::{ImageRef, ItemEntity, ItemFields};
use crate::dto::validation::{
    normalize_optional_text, required_error, validate_characters, validate_optional_url,
    validate_release_year, validate_required_text,
};

/// Field set submitted to create or replace a catalog item.
///
/// Every field is optional at the wire level so that missing values surface as validation
/// errors instead of opaque decoding failures.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    /// Game title; required.
    pub title: Option<String>,
    /// Game genre; required.
    pub genre: Option<String>,
    /// Integer year; numeric strings are accepted.
    #[schema(value_type = Option<i32>)]
    pub release_year: Option<ReleaseYearInput>,
    /// Platform; required.
    pub platform: Option<String>,
    /// Character names in display order; required, may be empty.
    pub characters: Option<Vec<String>>,
    /// Free-form description.
    pub description: Option<String>,
    /// Trailer link; must be a URL when not blank.
    pub trailer_url: Option<String>,
    /// External image URL used when no file is uploaded.
    pub image_url: Option<String>,
}

/// Release year as submitted by the client, before it is checked to be an integer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReleaseYearInput {
    /// JSON integer.
    Integer(i64),
    /// JSON number with a fractional part; only integral values pass.
    Float(f64),
    /// Form field or quoted number.
    Text(String),
}

impl fmt::Display for ReleaseYearInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseYearInput::Integer(year) => write!(f, "{year}"),
            ReleaseYearInput::Float(year) => write!(f, "{year}"),
            ReleaseYearInput::Text(text) => write!(f, "{text:?}"),
        }
    }
}

/// Validated item content still waiting for its image to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    /// Trimmed title.
    pub title: String,
    /// Trimmed genre.
    pub genre: String,
    /// Parsed release year.
    pub release_year: i32,
    /// Trimmed platform.
    pub platform: String,
    /// Trimmed character names.
    pub characters: Vec<String>,
    /// Description, `None` when blank.
    pub description: Option<String>,
    /// Trailer URL, `None` when blank.
    pub trailer_url: Option<String>,
    /// External image URL, `None` when blank.
    pub image_url: Option<String>,
}

impl ItemInput {
    /// Check every field and collect all failures, keyed by their wire name.
    pub fn into_draft(self) -> Result<ItemDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = collect(
            &mut errors,
            "title",
            validate_required_text(self.title.as_deref()),
        );
        let genre = collect(
            &mut errors,
            "genre",
            validate_required_text(self.genre.as_deref()),
        );
        let platform = collect(
            &mut errors,
            "platform",
            validate_required_text(self.platform.as_deref()),
        );
        let release_year = collect(
            &mut errors,
            "releaseYear",
            self.release_year
                .as_ref()
                .ok_or_else(required_error)
                .and_then(validate_release_year),
        );
        let characters = collect(
            &mut errors,
            "characters",
            self.characters
                .as_deref()
                .ok_or_else(required_error)
                .and_then(validate_characters),
        );
        let trailer_url = collect(
            &mut errors,
            "trailerUrl",
            validate_optional_url(self.trailer_url.as_deref()),
        );
        let image_url = collect(
            &mut errors,
            "imageUrl",
            validate_optional_url(self.image_url.as_deref()),
        );

        match (
            title,
            genre,
            release_year,
            platform,
            characters,
            trailer_url,
            image_url,
        ) {
            (
                Some(title),
                Some(genre),
                Some(release_year),
                Some(platform),
                Some(characters),
                Some(trailer_url),
                Some(image_url),
            ) if errors.is_empty() => Ok(ItemDraft {
                title,
                genre,
                release_year,
                platform,
                characters,
                description: normalize_optional_text(self.description.as_deref()),
                trailer_url,
                image_url,
            }),
            _ => Err(errors),
        }
    }
}

fn collect<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    result: Result<T, validator::ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.add(field, err);
            None
        }
    }
}

impl ItemDraft {
    /// Finish the draft once the uploaded file (if any) has been stored.
    pub fn into_fields(self, stored_image: Option<String>) -> ItemFields {
        ItemFields {
            title: self.title,
            genre: self.genre,
            release_year: self.release_year,
            platform: self.platform,
            characters: self.characters,
            description: self.description,
            trailer_url: self.trailer_url,
            image: ImageRef::resolve(stored_image, self.image_url),
        }
    }
}

/// Binary image attached to a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-side file name, used for the stored extension.
    pub file_name: Option<String>,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// File content.
    pub bytes: Bytes,
}

/// Catalog item as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameItem {
    /// Stable identifier used by edit and delete actions.
    pub id: String,
    /// Game title.
    pub title: String,
    /// Game genre.
    pub genre: String,
    /// Release year.
    pub release_year: i32,
    /// Platform.
    pub platform: String,
    /// Character names in display order.
    pub characters: Vec<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Trailer link.
    pub trailer_url: Option<String>,
    /// Path or URL of the image to display; the placeholder when none was supplied.
    pub image_ref: String,
}

impl From<ItemEntity> for GameItem {
    fn from(entity: ItemEntity) -> Self {
        let image_ref = entity.fields.image.display_path().to_owned();
        let ItemFields {
            title,
            genre,
            release_year,
            platform,
            characters,
            description,
            trailer_url,
            image: _,
        } = entity.fields;

        Self {
            id: entity.id.to_string(),
            title,
            genre,
            release_year,
            platform,
            characters,
            description,
            trailer_url,
            image_ref,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::PLACEHOLDER_IMAGE_PATH;

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

    #[test]
    fn valid_input_becomes_draft() {
        let draft = hades().into_draft().unwrap();
        assert_eq!(draft.title, "Hades");
        assert_eq!(draft.release_year, 2020);
        assert_eq!(draft.characters, vec!["Zagreus", "Hades"]);
        assert_eq!(draft.description, None);
        assert_eq!(draft.image_url, None);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = ItemInput::default().into_draft().unwrap_err();
        let fields = errors.field_errors();
        for name in ["title", "genre", "releaseYear", "platform", "characters"] {
            assert!(fields.contains_key(name), "missing error for {name}");
        }
    }

    #[test]
    fn missing_release_year_is_rejected() {
        let input = ItemInput {
            release_year: None,
            ..hades()
        };
        let errors = input.into_draft().unwrap_err();
        assert!(errors.field_errors().contains_key("releaseYear"));
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn numeric_string_year_from_forms_is_accepted() {
        let input = ItemInput {
            release_year: Some(ReleaseYearInput::Text("2020".into())),
            ..hades()
        };
        assert_eq!(input.into_draft().unwrap().release_year, 2020);
    }

    #[test]
    fn release_year_deserializes_from_number_or_string() {
        let number: ItemInput = serde_json::from_str(r#"{"releaseYear": 2020}"#).unwrap();
        assert_eq!(number.release_year, Some(ReleaseYearInput::Integer(2020)));

        let text: ItemInput = serde_json::from_str(r#"{"releaseYear": "2020"}"#).unwrap();
        assert_eq!(text.release_year, Some(ReleaseYearInput::Text("2020".into())));
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        let input = ItemInput {
            description: Some("  ".into()),
            trailer_url: Some(String::new()),
            image_url: Some(" ".into()),
            ..hades()
        };
        let draft = input.into_draft().unwrap();
        assert_eq!(draft.description, None);
        assert_eq!(draft.trailer_url, None);
        assert_eq!(draft.image_url, None);
    }

    #[test]
    fn draft_without_image_uses_placeholder() {
        let fields = hades().into_draft().unwrap().into_fields(None);
        assert_eq!(fields.image, ImageRef::Placeholder);
    }

    #[test]
    fn game_item_exposes_resolved_image() {
        let fields = hades().into_draft().unwrap().into_fields(None);
        let entity = ItemEntity::create(fields);
        let id = entity.id.to_string();

        let item = GameItem::from(entity);
        assert_eq!(item.id, id);
        assert_eq!(item.image_ref, PLACEHOLDER_IMAGE_PATH);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["releaseYear"], 2020);
        assert_eq!(json["imageRef"], PLACEHOLDER_IMAGE_PATH);
        assert!(json["description"].is_null());
    }
}
