use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use bazaar_core::envelope::ApiResponse;
use bazaar_domain::order::OrderStatus;

/// Shop service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ShopServiceError {
    // 400
    #[error("{0}")]
    Validation(String),
    #[error("insufficient stock")]
    InsufficientStock,
    #[error("cart is empty")]
    CartEmpty,
    #[error("order cannot be cancelled")]
    OrderNotCancellable,
    #[error("cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    // 401
    #[error("authorization token required")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("invalid credentials")]
    InvalidCredentials,

    // 403
    #[error("admin access required")]
    AdminRequired,
    #[error("resource belongs to another user")]
    NotOwner,
    #[error("you must purchase the product before reviewing")]
    PurchaseRequired,

    // 404
    #[error("user not found")]
    UserNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("image not found")]
    ImageNotFound,
    #[error("cart item not found")]
    CartItemNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("review not found")]
    ReviewNotFound,
    #[error("address not found")]
    AddressNotFound,

    // 409
    #[error("email already registered")]
    EmailAlreadyRegistered,
    #[error("sku already exists")]
    SkuAlreadyExists,
    #[error("category already exists")]
    CategoryAlreadyExists,
    #[error("cannot delete category with associated products")]
    CategoryHasProducts,
    #[error("you have already reviewed this product")]
    ReviewAlreadyExists,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ShopServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::InsufficientStock
            | Self::CartEmpty
            | Self::OrderNotCancellable
            | Self::InvalidStatusTransition { .. } => StatusCode::BAD_REQUEST,
            Self::MissingToken | Self::InvalidToken | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::AdminRequired | Self::NotOwner | Self::PurchaseRequired => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::ImageNotFound
            | Self::CartItemNotFound
            | Self::OrderNotFound
            | Self::ReviewNotFound
            | Self::AddressNotFound => StatusCode::NOT_FOUND,
            Self::EmailAlreadyRegistered
            | Self::SkuAlreadyExists
            | Self::CategoryAlreadyExists
            | Self::CategoryHasProducts
            | Self::ReviewAlreadyExists => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShopServiceError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        ApiResponse::failure(self.status(), self.to_string()).into_response()
    }
}

impl From<JsonRejection> for ShopServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ShopServiceError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<serde_qs::Error> for ShopServiceError {
    fn from(e: serde_qs::Error) -> Self {
        Self::Validation(format!("invalid query string: {e}"))
    }
}
