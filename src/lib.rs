//! Library crate for the game catalog back end, exposing modules for binaries and integration tests.

/// Runtime configuration file handling.
pub mod config;
/// Persistence: item stores and uploaded image files.
pub mod dao;
/// Wire shapes and their validation.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum routers and extractors.
pub mod routes;
/// Business rules between routes and storage.
pub mod services;
/// Shared application state.
pub mod state;
