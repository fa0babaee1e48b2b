use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether a store is installed and answering, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = match state.require_item_store().await {
        Ok(store) => store,
        Err(_) => {
            warn!("storage unavailable (degraded mode)");
            return HealthResponse::degraded();
        }
    };

    if let Err(err) = store.health_check().await {
        warn!(error = %err, "storage health check failed");
        return HealthResponse::degraded();
    }

    match store.count_items().await {
        Ok(count) => HealthResponse::ok(count),
        Err(err) => {
            warn!(error = %err, "failed to count items");
            HealthResponse::degraded()
        }
    }
}
