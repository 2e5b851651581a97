//! Request extractors whose rejections render as the shop's error envelope.

use axum::extract::{FromRequest, FromRequestParts};
use serde::de::DeserializeOwned;

use crate::error::ShopServiceError;

/// JSON body. Malformed or mistyped bodies become a 400 `Validation` error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ShopServiceError))]
pub struct Json<T>(pub T);

/// Path parameters. An unparsable id becomes a 400 `Validation` error.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ShopServiceError))]
pub struct Path<T>(pub T);

/// Parse a raw query string with `serde_qs`; absent means `T::default()`.
pub fn parse_query<T: DeserializeOwned + Default>(
    raw_query: Option<String>,
) -> Result<T, ShopServiceError> {
    Ok(raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()?
        .unwrap_or_default())
}
