//! Domain rules for AssetFlow.
//!
//! This crate has no IO. Everything here is shared by the repository layer,
//! the HTTP handlers, and the `create-admin` tool.

pub mod asset;
pub mod error;
pub mod export;
pub mod history;
pub mod license;
pub mod maintenance;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
