//! Request body extractors.

use axum::extract::FromRequest;
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// `axum::Json` whose rejection is reported through [`AppError`], so malformed
/// or mistyped bodies get the standard `{ "error", "code" }` 400 response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Deserialize a patch field that distinguishes "absent" from `null`.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: a missing key
/// stays `None`, an explicit `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
