//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- The active user behind a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires `Admin`.
//! - [`rbac::RequireManager`] -- Requires `Admin` or `Asset Manager`.
//! - [`rbac::RequireStaff`] -- Requires `Admin`, `Asset Manager`, or `HR`.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.

pub mod auth;
pub mod rbac;
