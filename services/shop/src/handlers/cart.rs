use axum::extract::State;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_auth_types::identity::Identity;
use bazaar_core::envelope::ApiResponse;

use crate::domain::types::{Cart, CartItem};
use crate::error::ShopServiceError;
use crate::handlers::extract::{Json, Path};
use crate::state::AppState;
use crate::usecase::cart::{
    AddToCartInput, AddToCartUseCase, ClearCartUseCase, GetCartUseCase, RemoveFromCartUseCase,
    UpdateCartItemUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CartResponse {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub total: Decimal,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: String,
    pub product_id: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            subtotal: item.subtotal(),
            id: item.id.to_string(),
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            total: cart.total(),
            id: cart.id.to_string(),
            user_id: cart.user_id.to_string(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            updated_at: cart.updated_at,
        }
    }
}

// ── GET /cart ────────────────────────────────────────────────────────────────

pub async fn get_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<ApiResponse<CartResponse>, ShopServiceError> {
    let usecase = GetCartUseCase {
        repo: state.cart_repo(),
    };
    let cart = usecase.execute(identity.user_id).await?;
    Ok(ApiResponse::ok(cart.into(), "cart retrieved successfully"))
}

// ── POST /cart/items ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub async fn add_item(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<ApiResponse<CartResponse>, ShopServiceError> {
    let usecase = AddToCartUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let cart = usecase
        .execute(
            identity.user_id,
            AddToCartInput {
                product_id: body.product_id,
                quantity: body.quantity,
            },
        )
        .await?;
    Ok(ApiResponse::ok(cart.into(), "item added to cart"))
}

// ── PUT /cart/items/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

pub async fn update_item(
    identity: Identity,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<ApiResponse<CartResponse>, ShopServiceError> {
    let usecase = UpdateCartItemUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let cart = usecase
        .execute(identity.user_id, item_id, body.quantity)
        .await?;
    Ok(ApiResponse::ok(cart.into(), "cart item updated"))
}

// ── DELETE /cart/items/{id} ──────────────────────────────────────────────────

pub async fn remove_item(
    identity: Identity,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ShopServiceError> {
    let usecase = RemoveFromCartUseCase {
        repo: state.cart_repo(),
    };
    usecase.execute(identity.user_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /cart ─────────────────────────────────────────────────────────────

pub async fn clear_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<StatusCode, ShopServiceError> {
    let usecase = ClearCartUseCase {
        repo: state.cart_repo(),
    };
    usecase.execute(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
