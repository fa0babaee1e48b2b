//! Request extractor for item submissions sent either as JSON or as a multipart form.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};

use crate::{
    dto::item::{ItemInput, ReleaseYearInput, UploadedImage},
    error::AppError,
};

/// Multipart part carrying the optional image file.
pub const IMAGE_FIELD: &str = "image";

/// Item fields plus the image attached to a multipart submission.
#[derive(Debug)]
pub struct ItemForm {
    /// Text fields, before validation.
    pub input: ItemInput,
    /// Non-empty `image` part, if one was sent.
    pub image: Option<UploadedImage>,
}

impl<S> FromRequest<S> for ItemForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| {
                    AppError::rejected_body(rejection.status(), rejection.body_text())
                })?;
            return read_multipart(multipart).await;
        }

        let Json(input) = Json::<ItemInput>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::rejected_body(rejection.status(), rejection.body_text())
            })?;
        Ok(Self { input, image: None })
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ItemForm, AppError> {
    let mut input = ItemInput::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::rejected_body(err.status(), err.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::rejected_body(err.status(), err.body_text()))?;

            // Browsers send an empty part when the file input was left blank.
            if !bytes.is_empty() {
                image = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|err| AppError::rejected_body(err.status(), err.body_text()))?;
        apply_text_field(&mut input, &name, value);
    }

    Ok(ItemForm { input, image })
}

fn apply_text_field(input: &mut ItemInput, name: &str, value: String) {
    match name {
        "title" => input.title = Some(value),
        "genre" => input.genre = Some(value),
        "releaseYear" => input.release_year = Some(ReleaseYearInput::Text(value)),
        "platform" => input.platform = Some(value),
        "characters" | "characters[]" => input
            .characters
            .get_or_insert_with(Vec::new)
            .extend(split_characters(&value)),
        "description" => input.description = Some(value),
        "trailerUrl" => input.trailer_url = Some(value),
        "imageUrl" => input.image_url = Some(value),
        _ => {}
    }
}

/// Characters arrive as a JSON array or a comma-separated list.
///
/// Blank entries are kept so validation rejects them the same way as in JSON bodies;
/// an empty field means no characters.
fn split_characters(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') {
        if let Ok(names) = serde_json::from_str::<Vec<String>>(trimmed) {
            return names;
        }
    }

    trimmed.split(',').map(|name| name.trim().to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_separated_characters() {
        assert_eq!(
            split_characters(" Zagreus, Hades ,Nyx"),
            vec!["Zagreus", "Hades", "Nyx"]
        );
        assert!(split_characters("  ").is_empty());
    }

    #[test]
    fn blank_names_survive_splitting() {
        assert_eq!(split_characters("Zagreus,,Hades"), vec!["Zagreus", "", "Hades"]);
    }

    #[test]
    fn accepts_json_array_of_characters() {
        assert_eq!(
            split_characters(r#"["Geralt of Rivia", "Ciri"]"#),
            vec!["Geralt of Rivia", "Ciri"]
        );
    }

    #[test]
    fn repeated_character_fields_accumulate() {
        let mut input = ItemInput::default();
        apply_text_field(&mut input, "characters[]", "Joel Miller".into());
        apply_text_field(&mut input, "characters[]", "Ellie Williams".into());
        apply_text_field(&mut input, "releaseYear", "2013".into());
        apply_text_field(&mut input, "unknown", "ignored".into());

        assert_eq!(
            input.characters,
            Some(vec!["Joel Miller".to_owned(), "Ellie Williams".to_owned()])
        );
        assert_eq!(
            input.release_year,
            Some(ReleaseYearInput::Text("2013".into()))
        );
    }
}
