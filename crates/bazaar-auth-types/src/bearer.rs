//! `Authorization: Bearer <token>` parsing.

use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use http::HeaderMap;

/// Token from the `Authorization` header, if the header is present and uses
/// the Bearer scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
        .filter(|token| !token.is_empty())
}
