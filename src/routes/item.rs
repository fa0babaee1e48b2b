use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::{
    dto::item::{GameItem, ItemInput},
    error::AppError,
    routes::extract::ItemForm,
    services::item_service,
    state::SharedState,
};

/// Plain-text confirmation returned by the add endpoint.
pub const ADD_ITEM_CONFIRMATION: &str = "Item added successfully";

/// Catalog CRUD routes; request bodies (including uploads) are capped at `max_body_bytes`.
pub fn router(max_body_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/api/data", get(list_items))
        .route("/api/add-item", post(add_item))
        .route("/api/edit-item/{id}", put(edit_item))
        .route("/api/delete-item/{id}", delete(delete_item))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// List every catalog item.
#[utoipa::path(
    get,
    path = "/api/data",
    tag = "items",
    responses(
        (status = 200, description = "All catalog items", body = [GameItem]),
        (status = 500, description = "Storage failure", body = String)
    )
)]
pub async fn list_items(State(state): State<SharedState>) -> Result<Json<Vec<GameItem>>, AppError> {
    Ok(Json(item_service::list_items(&state).await?))
}

/// Create an item from JSON or a multipart form with an optional `image` file.
#[utoipa::path(
    post,
    path = "/api/add-item",
    tag = "items",
    request_body = ItemInput,
    responses(
        (status = 200, description = "Item created", body = String),
        (status = 400, description = "Validation failed", body = String),
        (status = 413, description = "Body exceeds the upload limit", body = String)
    )
)]
pub async fn add_item(
    State(state): State<SharedState>,
    form: ItemForm,
) -> Result<(StatusCode, &'static str), AppError> {
    item_service::create_item(&state, form.input, form.image).await?;
    Ok((StatusCode::OK, ADD_ITEM_CONFIRMATION))
}

/// Replace every field of an existing item.
#[utoipa::path(
    put,
    path = "/api/edit-item/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Identifier of the item to replace")),
    request_body = ItemInput,
    responses(
        (status = 200, description = "Updated item", body = GameItem),
        (status = 400, description = "Validation failed", body = String),
        (status = 413, description = "Body exceeds the upload limit", body = String),
        (status = 404, description = "Unknown item", body = String)
    )
)]
pub async fn edit_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: ItemForm,
) -> Result<Json<GameItem>, AppError> {
    let item = item_service::update_item(&state, &id, form.input, form.image).await?;
    Ok(Json(item))
}

/// Delete an item and return it.
#[utoipa::path(
    delete,
    path = "/api/delete-item/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Identifier of the item to delete")),
    responses(
        (status = 200, description = "Removed item", body = GameItem),
        (status = 404, description = "Unknown item", body = String)
    )
)]
pub async fn delete_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameItem>, AppError> {
    Ok(Json(item_service::delete_item(&state, &id).await?))
}
