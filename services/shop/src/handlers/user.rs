use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use bazaar_auth_types::identity::Identity;
use bazaar_core::envelope::ApiResponse;
use bazaar_domain::user::UserRole;

use crate::domain::types::User;
use crate::error::ShopServiceError;
use crate::handlers::extract::Json;
use crate::state::AppState;
use crate::usecase::user::{
    DeleteUserUseCase, GetUserUseCase, UpdateUserInput, UpdateUserUseCase,
};

/// Public view of an account. The password hash never leaves the service.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── GET /users/me ────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<ApiResponse<UserResponse>, ShopServiceError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(ApiResponse::ok(user.into(), "user retrieved successfully"))
}

// ── PUT /users/me ────────────────────────────────────────────────────────────

/// Absent fields are left unchanged. A `role` key is ignored.
#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn update_me(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<ApiResponse<UserResponse>, ShopServiceError> {
    let usecase = UpdateUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(
            identity.user_id,
            UpdateUserInput {
                name: body.name,
                email: body.email,
                password: body.password,
            },
        )
        .await?;
    Ok(ApiResponse::ok(user.into(), "user updated successfully"))
}

// ── DELETE /users/me ─────────────────────────────────────────────────────────

pub async fn delete_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<StatusCode, ShopServiceError> {
    let usecase = DeleteUserUseCase {
        repo: state.user_repo(),
    };
    usecase.execute(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
