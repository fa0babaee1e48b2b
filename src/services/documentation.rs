use utoipa::OpenApi;

/// Aggregated OpenAPI specification for the game catalog API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::item::list_items,
        crate::routes::item::add_item,
        crate::routes::item::edit_item,
        crate::routes::item::delete_item,
        crate::routes::character::character_image,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::item::ItemInput,
            crate::dto::item::GameItem,
            crate::dto::character::CharacterImageResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "items", description = "Catalog item management"),
        (name = "characters", description = "Character image lookup"),
    )
)]
pub struct ApiDoc;
