use serde::Serialize;
use utoipa::ToSchema;

/// Payload of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when a store is installed and answering, "degraded" otherwise.
    pub status: &'static str,
    /// Number of catalog items, when the store could be counted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<u64>,
}

impl HealthResponse {
    /// Store reachable and holding `items` records.
    pub fn ok(items: u64) -> Self {
        Self {
            status: "ok",
            items: Some(items),
        }
    }

    /// No usable store.
    pub fn degraded() -> Self {
        Self {
            status: "degraded",
            items: None,
        }
    }
}
