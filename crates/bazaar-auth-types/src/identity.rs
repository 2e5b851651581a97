//! Authenticated caller extractor.

use axum::extract::FromRequestParts;
use bazaar_core::envelope::ApiResponse;
use bazaar_domain::user::UserRole;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use crate::token::TokenInfo;

/// The caller behind a validated bearer token.
///
/// The auth middleware inserts this into request extensions; handlers take it
/// as an extractor. Extraction answers 401 when no middleware ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<TokenInfo> for Identity {
    fn from(info: TokenInfo) -> Self {
        Self {
            user_id: info.user_id,
            email: info.email,
            role: info.role,
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiResponse<()>;

    // Read synchronously and return a 'static future so the borrow of `parts`
    // does not leak into the returned future.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<Identity>().cloned();

        async move {
            identity.ok_or_else(|| {
                ApiResponse::failure(StatusCode::UNAUTHORIZED, "authorization token required")
            })
        }
    }
}
