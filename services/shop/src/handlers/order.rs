use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_auth_types::identity::Identity;
use bazaar_core::envelope::ApiResponse;
use bazaar_domain::order::OrderStatus;
use bazaar_domain::pagination::{Page, PageRequest};

use crate::domain::types::{Order, OrderItem};
use crate::error::ShopServiceError;
use crate::handlers::extract::{Json, Path, parse_query};
use crate::state::AppState;
use crate::usecase::order::{
    CancelOrderUseCase, CreateOrderInput, CreateOrderUseCase, GetOrderUseCase,
    ListAllOrdersUseCase, ListOrdersUseCase, UpdateOrderStatusInput, UpdateOrderStatusUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address_id: Option<String>,
    pub payment_id: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItemResponse>,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            subtotal: item.subtotal(),
            id: item.id.to_string(),
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            status: order.status,
            total_amount: order.total_amount,
            shipping_address_id: order.shipping_address_id.map(|id| id.to_string()),
            payment_id: order.payment_id,
            tracking_number: order.tracking_number,
            notes: order.notes,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OrderListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub status: Option<String>,
}

// ── POST /orders ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CreateOrderRequest {
    pub shipping_address_id: Option<Uuid>,
    pub payment_id: Option<String>,
    pub notes: Option<String>,
}

/// The body is optional; an empty request checks out with the default address.
pub async fn create_order(
    identity: Identity,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<ApiResponse<OrderResponse>, ShopServiceError> {
    let body: CreateOrderRequest = if body.is_empty() {
        CreateOrderRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ShopServiceError::validation(format!("invalid request body: {e}")))?
    };
    let usecase = CreateOrderUseCase {
        orders: state.order_repo(),
        carts: state.cart_repo(),
        addresses: state.address_repo(),
    };
    let order = usecase
        .execute(
            identity.user_id,
            CreateOrderInput {
                shipping_address_id: body.shipping_address_id,
                payment_id: body.payment_id,
                notes: body.notes,
            },
        )
        .await?;
    Ok(ApiResponse::created(order.into(), "order created successfully"))
}

// ── GET /orders ──────────────────────────────────────────────────────────────

pub async fn list_orders(
    identity: Identity,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<ApiResponse<Page<OrderResponse>>, ShopServiceError> {
    let query: OrderListQuery = parse_query(raw_query)?;
    let usecase = ListOrdersUseCase {
        repo: state.order_repo(),
    };
    let orders = usecase
        .execute(
            identity.user_id,
            PageRequest::from_query(query.per_page, query.page),
        )
        .await?;
    Ok(ApiResponse::ok(
        orders.map(OrderResponse::from),
        "orders retrieved successfully",
    ))
}

// ── GET /orders/{id} ─────────────────────────────────────────────────────────

pub async fn get_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<OrderResponse>, ShopServiceError> {
    let usecase = GetOrderUseCase {
        repo: state.order_repo(),
    };
    let order = usecase.execute(id, identity.user_id).await?;
    Ok(ApiResponse::ok(order.into(), "order retrieved successfully"))
}

// ── POST /orders/{id}/cancel ─────────────────────────────────────────────────

pub async fn cancel_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<OrderResponse>, ShopServiceError> {
    let usecase = CancelOrderUseCase {
        repo: state.order_repo(),
    };
    let order = usecase.execute(id, identity.user_id).await?;
    Ok(ApiResponse::ok(order.into(), "order cancelled successfully"))
}

// ── GET /admin/orders ────────────────────────────────────────────────────────

fn parse_status(value: &str) -> Result<OrderStatus, ShopServiceError> {
    value
        .trim()
        .parse()
        .map_err(|_| ShopServiceError::validation(format!("invalid order status: {value}")))
}

pub async fn list_all_orders(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<ApiResponse<Page<OrderResponse>>, ShopServiceError> {
    let query: OrderListQuery = parse_query(raw_query)?;
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let usecase = ListAllOrdersUseCase {
        repo: state.order_repo(),
    };
    let orders = usecase
        .execute(status, PageRequest::from_query(query.per_page, query.page))
        .await?;
    Ok(ApiResponse::ok(
        orders.map(OrderResponse::from),
        "orders retrieved successfully",
    ))
}

// ── PUT /admin/orders/{id}/status ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub tracking_number: Option<String>,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<ApiResponse<OrderResponse>, ShopServiceError> {
    let status = parse_status(&body.status)?;
    let usecase = UpdateOrderStatusUseCase {
        repo: state.order_repo(),
    };
    let order = usecase
        .execute(
            id,
            UpdateOrderStatusInput {
                status,
                tracking_number: body.tracking_number,
            },
        )
        .await?;
    Ok(ApiResponse::ok(
        order.into(),
        "order status updated successfully",
    ))
}
