use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_core::envelope::ApiResponse;

use crate::domain::types::Category;
use crate::error::ShopServiceError;
use crate::handlers::extract::{Json, Path};
use crate::state::AppState;
use crate::usecase::category::{
    CategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase,
    ListCategoriesUseCase, UpdateCategoryUseCase,
};

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(body: CategoryRequest) -> Self {
        Self {
            name: body.name,
            description: body.description,
        }
    }
}

// ── GET /categories ──────────────────────────────────────────────────────────

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CategoryResponse>>, ShopServiceError> {
    let usecase = ListCategoriesUseCase {
        repo: state.category_repo(),
    };
    let categories = usecase.execute().await?;
    Ok(ApiResponse::ok(
        categories.into_iter().map(CategoryResponse::from).collect(),
        "categories retrieved successfully",
    ))
}

// ── GET /categories/{id} ─────────────────────────────────────────────────────

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<CategoryResponse>, ShopServiceError> {
    let usecase = GetCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = usecase.execute(id).await?;
    Ok(ApiResponse::ok(
        category.into(),
        "category retrieved successfully",
    ))
}

// ── POST /admin/categories ───────────────────────────────────────────────────

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> Result<ApiResponse<CategoryResponse>, ShopServiceError> {
    let usecase = CreateCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = usecase.execute(body.into()).await?;
    Ok(ApiResponse::created(
        category.into(),
        "category created successfully",
    ))
}

// ── PUT /admin/categories/{id} ───────────────────────────────────────────────

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryRequest>,
) -> Result<ApiResponse<CategoryResponse>, ShopServiceError> {
    let usecase = UpdateCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = usecase.execute(id, body.into()).await?;
    Ok(ApiResponse::ok(
        category.into(),
        "category updated successfully",
    ))
}

// ── DELETE /admin/categories/{id} ────────────────────────────────────────────

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ShopServiceError> {
    let usecase = DeleteCategoryUseCase {
        repo: state.category_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
