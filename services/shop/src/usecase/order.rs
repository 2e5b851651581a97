use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use bazaar_domain::order::OrderStatus;
use bazaar_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AddressRepository, CartRepository, OrderRepository};
use crate::domain::types::{Order, OrderItem};
use crate::error::ShopServiceError;

async fn owned_order<O: OrderRepository>(
    orders: &O,
    id: Uuid,
    user_id: Uuid,
) -> Result<Order, ShopServiceError> {
    let order = orders
        .find_by_id(id)
        .await?
        .ok_or(ShopServiceError::OrderNotFound)?;
    if order.user_id != user_id {
        return Err(ShopServiceError::NotOwner);
    }
    Ok(order)
}

// ── CreateOrder ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CreateOrderInput {
    /// Must be one of the caller's addresses. Falls back to the default address.
    pub shipping_address_id: Option<Uuid>,
    pub payment_id: Option<String>,
    pub notes: Option<String>,
}

pub struct CreateOrderUseCase<O: OrderRepository, C: CartRepository, A: AddressRepository> {
    pub orders: O,
    pub carts: C,
    pub addresses: A,
}

impl<O: OrderRepository, C: CartRepository, A: AddressRepository> CreateOrderUseCase<O, C, A> {
    /// Snapshot the cart into a pending order. Stock reservation, order insert
    /// and cart drain happen in one transaction inside the repository.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: CreateOrderInput,
    ) -> Result<Order, ShopServiceError> {
        let Some(cart) = self
            .carts
            .find_by_user(user_id)
            .await?
            .filter(|cart| !cart.is_empty())
        else {
            return Err(ShopServiceError::CartEmpty);
        };

        let shipping_address_id = match input.shipping_address_id {
            Some(address_id) => {
                let address = self
                    .addresses
                    .find_by_id(address_id)
                    .await?
                    .filter(|a| a.user_id == user_id)
                    .ok_or(ShopServiceError::AddressNotFound)?;
                Some(address.id)
            }
            None => self.addresses.find_default(user_id).await?.map(|a| a.id),
        };

        let order_id = Uuid::now_v7();
        let items: Vec<OrderItem> = cart
            .items
            .iter()
            .map(|line| OrderItem {
                id: Uuid::now_v7(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();
        let total_amount: Decimal = items.iter().map(OrderItem::subtotal).sum();

        let now = Utc::now();
        let order = Order {
            id: order_id,
            user_id,
            status: OrderStatus::Pending,
            total_amount,
            shipping_address_id,
            payment_id: input.payment_id,
            tracking_number: None,
            notes: input.notes,
            items,
            created_at: now,
            updated_at: now,
        };
        self.orders.place(&order, cart.id).await?;
        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.total_amount,
            lines = order.items.len(),
            "order placed"
        );
        Ok(order)
    }
}

// ── GetOrder / ListOrders ────────────────────────────────────────────────────

pub struct GetOrderUseCase<O: OrderRepository> {
    pub repo: O,
}

impl<O: OrderRepository> GetOrderUseCase<O> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<Order, ShopServiceError> {
        owned_order(&self.repo, id, user_id).await
    }
}

pub struct ListOrdersUseCase<O: OrderRepository> {
    pub repo: O,
}

impl<O: OrderRepository> ListOrdersUseCase<O> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError> {
        self.repo.list_by_user(user_id, page.clamped()).await
    }
}

/// Admin listing across all users.
pub struct ListAllOrdersUseCase<O: OrderRepository> {
    pub repo: O,
}

impl<O: OrderRepository> ListAllOrdersUseCase<O> {
    pub async fn execute(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError> {
        self.repo.list(status, page.clamped()).await
    }
}

// ── CancelOrder ──────────────────────────────────────────────────────────────

pub struct CancelOrderUseCase<O: OrderRepository> {
    pub repo: O,
}

impl<O: OrderRepository> CancelOrderUseCase<O> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<Order, ShopServiceError> {
        let order = owned_order(&self.repo, id, user_id).await?;
        if order.status != OrderStatus::Pending {
            return Err(ShopServiceError::OrderNotCancellable);
        }
        let swapped = self
            .repo
            .transition(id, OrderStatus::Pending, OrderStatus::Cancelled, None)
            .await?;
        if !swapped {
            return Err(ShopServiceError::OrderNotCancellable);
        }
        tracing::info!(order_id = %id, user_id = %user_id, "order cancelled");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ShopServiceError::OrderNotFound)
    }
}

// ── UpdateOrderStatus ────────────────────────────────────────────────────────

pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
}

pub struct UpdateOrderStatusUseCase<O: OrderRepository> {
    pub repo: O,
}

impl<O: OrderRepository> UpdateOrderStatusUseCase<O> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: UpdateOrderStatusInput,
    ) -> Result<Order, ShopServiceError> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ShopServiceError::OrderNotFound)?;
        let from = order.status;
        let to = input.status;
        if !from.can_transition_to(to) {
            return Err(ShopServiceError::InvalidStatusTransition { from, to });
        }

        let tracking_number = input
            .tracking_number
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if !self.repo.transition(id, from, to, tracking_number).await? {
            // Lost a race with another writer; report against the status it moved to.
            let current = self
                .repo
                .find_by_id(id)
                .await?
                .map_or(from, |o| o.status);
            return Err(ShopServiceError::InvalidStatusTransition { from: current, to });
        }
        tracing::info!(order_id = %id, from = %from, to = %to, "order status changed");

        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ShopServiceError::OrderNotFound)
    }
}
