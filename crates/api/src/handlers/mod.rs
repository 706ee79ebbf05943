//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers validate input, delegate to the repositories in `assetflow_db`,
//! and map errors via [`AppError`](crate::error::AppError).

pub mod assets;
pub mod auth;
pub mod dashboard;
pub mod licenses;
pub mod maintenance;
pub mod users;
