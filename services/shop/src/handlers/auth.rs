use axum::extract::State;
use serde::{Deserialize, Serialize};

use bazaar_core::envelope::ApiResponse;

use crate::error::ShopServiceError;
use crate::handlers::extract::Json;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::auth::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiResponse<UserResponse>, ShopServiceError> {
    let usecase = RegisterUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            name: body.name,
        })
        .await?;
    Ok(ApiResponse::created(
        user.into(),
        "user registered successfully",
    ))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserResponse,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, ShopServiceError> {
    let usecase = LoginUseCase {
        repo: state.user_repo(),
        jwt_secret: state.jwt.secret.to_string(),
        jwt_expiration_secs: state.jwt.expiration_secs,
    };
    let output = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(ApiResponse::ok(
        LoginResponse {
            token: output.token,
            token_type: "Bearer",
            expires_in: output.expires_in,
            user: output.user.into(),
        },
        "login successful",
    ))
}
