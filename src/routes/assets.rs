use axum::Router;
use tower_http::services::ServeDir;

use crate::{config::AppConfig, dao::image_store::UPLOADS_URL_PREFIX, state::SharedState};

/// Serve uploaded images under `/uploads` and the browser client from the public directory.
pub fn router(config: &AppConfig) -> Router<SharedState> {
    Router::new()
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(config.uploads_dir()))
        .fallback_service(ServeDir::new(config.public_dir()))
}
