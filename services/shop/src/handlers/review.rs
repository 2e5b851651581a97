use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_auth_types::identity::Identity;
use bazaar_core::envelope::ApiResponse;

use crate::domain::types::Review;
use crate::error::ShopServiceError;
use crate::handlers::extract::{Json, Path};
use crate::state::AppState;
use crate::usecase::review::{
    CreateReviewInput, CreateReviewUseCase, DeleteReviewUseCase, ListProductReviewsUseCase,
    ListUserReviewsUseCase, UpdateReviewInput, UpdateReviewUseCase,
};

#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub rating: i16,
    pub title: String,
    pub comment: String,
    pub is_verified: bool,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.to_string(),
            user_id: review.user_id.to_string(),
            product_id: review.product_id.to_string(),
            rating: review.rating,
            title: review.title,
            comment: review.comment,
            is_verified: review.is_verified,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

fn responses(reviews: Vec<Review>) -> Vec<ReviewResponse> {
    reviews.into_iter().map(ReviewResponse::from).collect()
}

// ── GET /products/{id}/reviews ───────────────────────────────────────────────

pub async fn list_product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<ApiResponse<Vec<ReviewResponse>>, ShopServiceError> {
    let usecase = ListProductReviewsUseCase {
        reviews: state.review_repo(),
        products: state.product_repo(),
    };
    let reviews = usecase.execute(product_id).await?;
    Ok(ApiResponse::ok(
        responses(reviews),
        "reviews retrieved successfully",
    ))
}

// ── POST /products/{id}/reviews ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i16,
    pub title: Option<String>,
    pub comment: Option<String>,
}

pub async fn create_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<ApiResponse<ReviewResponse>, ShopServiceError> {
    let usecase = CreateReviewUseCase {
        reviews: state.review_repo(),
        orders: state.order_repo(),
        products: state.product_repo(),
    };
    let review = usecase
        .execute(
            identity.user_id,
            product_id,
            CreateReviewInput {
                rating: body.rating,
                title: body.title,
                comment: body.comment,
            },
        )
        .await?;
    Ok(ApiResponse::created(
        review.into(),
        "review created successfully",
    ))
}

// ── GET /users/me/reviews ────────────────────────────────────────────────────

pub async fn list_my_reviews(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ReviewResponse>>, ShopServiceError> {
    let usecase = ListUserReviewsUseCase {
        repo: state.review_repo(),
    };
    let reviews = usecase.execute(identity.user_id).await?;
    Ok(ApiResponse::ok(
        responses(reviews),
        "reviews retrieved successfully",
    ))
}

// ── PUT /reviews/{id} ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i16>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

pub async fn update_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateReviewRequest>,
) -> Result<ApiResponse<ReviewResponse>, ShopServiceError> {
    let usecase = UpdateReviewUseCase {
        repo: state.review_repo(),
    };
    let review = usecase
        .execute(
            identity.user_id,
            id,
            UpdateReviewInput {
                rating: body.rating,
                title: body.title,
                comment: body.comment,
            },
        )
        .await?;
    Ok(ApiResponse::ok(review.into(), "review updated successfully"))
}

// ── DELETE /reviews/{id} ─────────────────────────────────────────────────────

pub async fn delete_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ShopServiceError> {
    let usecase = DeleteReviewUseCase {
        repo: state.review_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
