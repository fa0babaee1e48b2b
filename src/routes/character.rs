use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::character::{CharacterImageQuery, CharacterImageResponse},
    services::character_service,
    state::SharedState,
};

/// Character lookup routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/character-images", get(character_image))
}

/// Look up the image of a character in a game, falling back to the default image.
#[utoipa::path(
    get,
    path = "/api/character-images",
    tag = "characters",
    params(CharacterImageQuery),
    responses(
        (status = 200, description = "Resolved character image", body = CharacterImageResponse),
        (status = 400, description = "Missing or empty query parameter")
    )
)]
pub async fn character_image(
    State(state): State<SharedState>,
    Valid(Query(query)): Valid<Query<CharacterImageQuery>>,
) -> Json<CharacterImageResponse> {
    Json(character_service::character_image(
        state.config(),
        &query.title,
        &query.character,
    ))
}
