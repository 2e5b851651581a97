use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use bazaar_auth_types::bearer::bearer_token;
use bazaar_auth_types::identity::Identity;
use bazaar_auth_types::token::validate_access_token;

use crate::error::ShopServiceError;
use crate::state::AppState;

/// Validate the bearer token and attach the caller's `Identity` to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ShopServiceError> {
    let Some(token) = bearer_token(request.headers()) else {
        warn!(path = %request.uri().path(), "request without bearer token");
        return Err(ShopServiceError::MissingToken);
    };
    let info = validate_access_token(&token, &state.jwt.secret).map_err(|e| {
        warn!(path = %request.uri().path(), error = %e, "bearer token rejected");
        ShopServiceError::InvalidToken
    })?;
    request.extensions_mut().insert(Identity::from(info));
    Ok(next.run(request).await)
}

/// Must run inside `require_auth`.
pub async fn require_admin(
    identity: Identity,
    request: Request,
    next: Next,
) -> Result<Response, ShopServiceError> {
    if !identity.is_admin() {
        warn!(user_id = %identity.user_id, path = %request.uri().path(), "admin route denied");
        return Err(ShopServiceError::AdminRequired);
    }
    Ok(next.run(request).await)
}
