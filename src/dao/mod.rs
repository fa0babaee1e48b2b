/// Disk storage for uploaded item images.
pub mod image_store;
/// Catalog item persistence backends.
pub mod item_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
