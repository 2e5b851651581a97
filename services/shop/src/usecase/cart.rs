use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::types::{Cart, CartItem};
use crate::error::ShopServiceError;

fn positive_quantity(quantity: i32) -> Result<i32, ShopServiceError> {
    if quantity <= 0 {
        return Err(ShopServiceError::validation("quantity must be greater than 0"));
    }
    Ok(quantity)
}

// ── GetCart ──────────────────────────────────────────────────────────────────

pub struct GetCartUseCase<C: CartRepository> {
    pub repo: C,
}

impl<C: CartRepository> GetCartUseCase<C> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Cart, ShopServiceError> {
        self.repo.get_or_create(user_id).await
    }
}

// ── AddToCart ────────────────────────────────────────────────────────────────

pub struct AddToCartInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub struct AddToCartUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> AddToCartUseCase<C, P> {
    /// Adding a product already in the cart merges into its line and re-prices
    /// the line at the product's current price. Stock is checked, not reserved.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: AddToCartInput,
    ) -> Result<Cart, ShopServiceError> {
        let quantity = positive_quantity(input.quantity)?;
        let product = self
            .products
            .find_by_id(input.product_id)
            .await?
            .ok_or(ShopServiceError::ProductNotFound)?;

        let cart = self.carts.get_or_create(user_id).await?;
        let now = Utc::now();
        match self
            .carts
            .find_item_by_product(cart.id, product.id)
            .await?
        {
            Some(mut item) => {
                let merged = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or(ShopServiceError::InsufficientStock)?;
                if merged > product.stock {
                    return Err(ShopServiceError::InsufficientStock);
                }
                item.quantity = merged;
                item.price = product.price;
                item.updated_at = now;
                self.carts.update_item(&item).await?;
            }
            None => {
                if quantity > product.stock {
                    return Err(ShopServiceError::InsufficientStock);
                }
                let item = CartItem {
                    id: Uuid::now_v7(),
                    cart_id: cart.id,
                    product_id: product.id,
                    quantity,
                    price: product.price,
                    created_at: now,
                    updated_at: now,
                };
                self.carts.insert_item(&item).await?;
            }
        }

        self.carts.get_or_create(user_id).await
    }
}

// ── UpdateCartItem ───────────────────────────────────────────────────────────

pub struct UpdateCartItemUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> UpdateCartItemUseCase<C, P> {
    /// Sets the line quantity. The line keeps its price snapshot.
    pub async fn execute(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, ShopServiceError> {
        let quantity = positive_quantity(quantity)?;
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(ShopServiceError::CartItemNotFound)?;
        let mut item = self
            .carts
            .find_item(cart.id, item_id)
            .await?
            .ok_or(ShopServiceError::CartItemNotFound)?;

        let product = self
            .products
            .find_by_id(item.product_id)
            .await?
            .ok_or(ShopServiceError::ProductNotFound)?;
        if quantity > product.stock {
            return Err(ShopServiceError::InsufficientStock);
        }

        item.quantity = quantity;
        item.updated_at = Utc::now();
        self.carts.update_item(&item).await?;
        self.carts.get_or_create(user_id).await
    }
}

// ── RemoveFromCart / ClearCart ───────────────────────────────────────────────

pub struct RemoveFromCartUseCase<C: CartRepository> {
    pub repo: C,
}

impl<C: CartRepository> RemoveFromCartUseCase<C> {
    pub async fn execute(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ShopServiceError> {
        let cart = self
            .repo
            .find_by_user(user_id)
            .await?
            .ok_or(ShopServiceError::CartItemNotFound)?;
        if !self.repo.remove_item(cart.id, item_id).await? {
            return Err(ShopServiceError::CartItemNotFound);
        }
        Ok(())
    }
}

pub struct ClearCartUseCase<C: CartRepository> {
    pub repo: C,
}

impl<C: CartRepository> ClearCartUseCase<C> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), ShopServiceError> {
        match self.repo.find_by_user(user_id).await? {
            Some(cart) => self.repo.clear(cart.id).await,
            None => Ok(()),
        }
    }
}
