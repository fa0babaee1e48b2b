/// Character image lookup backed by the configured table.
pub mod character_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Catalog item validation, image handling and persistence.
pub mod item_service;
/// Storage connection supervisor with degraded mode handling.
pub mod storage_supervisor;
