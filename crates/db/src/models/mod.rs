//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod asset;
pub mod dashboard;
pub mod history;
pub mod license;
pub mod maintenance;
pub mod session;
pub mod user;
