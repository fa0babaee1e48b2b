/// Character image lookup payloads.
pub mod character;
/// Health check payload.
pub mod health;
/// Item submissions and responses.
pub mod item;
pub mod validation;
