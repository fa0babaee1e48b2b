use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query identifying a character within a game.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CharacterImageQuery {
    /// Title of the game the character appears in.
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    /// Character name as listed on the item.
    #[validate(length(min = 1, message = "character must not be empty"))]
    pub character: String,
}

/// Image resolved for a character, or the default image when none is configured.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CharacterImageResponse {
    /// Game title, echoed from the query.
    pub title: String,
    /// Character name, echoed from the query.
    pub character: String,
    /// Configured image file name, or the default image.
    pub image_url: String,
}
