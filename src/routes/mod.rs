use axum::Router;

use crate::state::SharedState;

/// Uploaded images and the browser client.
pub mod assets;
/// Character image lookup.
pub mod character;
/// Swagger UI.
pub mod docs;
pub mod extract;
/// Health check.
pub mod health;
/// Catalog CRUD.
pub mod item;

/// Compose all route trees, wiring in shared state, documentation and static files.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(item::router(state.config().max_upload_bytes()))
        .merge(character::router());

    let assets_router = assets::router(state.config());

    api_router
        .merge(docs::router())
        .merge(assets_router)
        .with_state(state)
}
