#![allow(async_fn_in_trait)]

use uuid::Uuid;

use bazaar_domain::order::OrderStatus;
use bazaar_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Address, Cart, CartItem, Category, Order, Product, ProductFilter, ProductImage, Review, User,
};
use crate::error::ShopServiceError;

/// Repository for accounts. Soft-deleted users are invisible to every read.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ShopServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ShopServiceError>;
    /// Fails with `EmailAlreadyRegistered` when a live user holds the email.
    async fn create(&self, user: &User) -> Result<(), ShopServiceError>;
    /// Overwrite email, name and password hash. Same conflict rule as `create`.
    async fn update(&self, user: &User) -> Result<(), ShopServiceError>;
    /// Returns `true` if a live row was marked deleted.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError>;
}

pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, ShopServiceError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, ShopServiceError>;
    async fn list(&self) -> Result<Vec<Category>, ShopServiceError>;
    /// Fails with `CategoryAlreadyExists` on a duplicate live name.
    async fn create(&self, category: &Category) -> Result<(), ShopServiceError>;
    async fn update(&self, category: &Category) -> Result<(), ShopServiceError>;
    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError>;
    /// Whether any live product references the category.
    async fn has_products(&self, id: Uuid) -> Result<bool, ShopServiceError>;
}

/// Repository for catalog products and their images.
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ShopServiceError>;
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, ShopServiceError>;
    /// Fails with `SkuAlreadyExists` on a duplicate live SKU.
    async fn create(&self, product: &Product) -> Result<(), ShopServiceError>;
    async fn update(&self, product: &Product) -> Result<(), ShopServiceError>;
    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError>;

    async fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>, ShopServiceError>;
    /// Insert an image. When it is primary, every other image of the product
    /// loses the flag in the same transaction.
    async fn add_image(&self, image: &ProductImage) -> Result<(), ShopServiceError>;
    /// Soft-delete an image. Removing the primary image promotes the oldest
    /// remaining one in the same transaction.
    async fn remove_image(&self, product_id: Uuid, image_id: Uuid)
    -> Result<bool, ShopServiceError>;
}

/// Repository for carts. Every item operation is scoped by the owning cart.
pub trait CartRepository: Send + Sync {
    /// The user's cart with its lines, created empty on first access.
    async fn get_or_create(&self, user_id: Uuid) -> Result<Cart, ShopServiceError>;
    /// The user's cart with its lines, without creating one.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ShopServiceError>;
    async fn find_item(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<CartItem>, ShopServiceError>;
    async fn find_item_by_product(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, ShopServiceError>;
    async fn insert_item(&self, item: &CartItem) -> Result<(), ShopServiceError>;
    /// Overwrite quantity and price of an existing line.
    async fn update_item(&self, item: &CartItem) -> Result<(), ShopServiceError>;
    async fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, ShopServiceError>;
    async fn clear(&self, cart_id: Uuid) -> Result<(), ShopServiceError>;
}

pub trait OrderRepository: Send + Sync {
    /// Atomically reserve stock for every line, persist the order and its
    /// items, and drain the cart. Fails with `InsufficientStock` and changes
    /// nothing when any line cannot be reserved.
    async fn place(&self, order: &Order, cart_id: Uuid) -> Result<(), ShopServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ShopServiceError>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError>;
    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError>;
    /// Compare-and-swap the status from `from` to `to`. Returns `false` when the
    /// order was no longer in `from`. Moving to `cancelled` restores the
    /// reserved stock in the same transaction.
    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<bool, ShopServiceError>;
    /// Whether the user has a delivered order containing the product.
    async fn has_delivered_purchase(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, ShopServiceError>;
}

pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, ShopServiceError>;
    async fn find_by_user_and_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Review>, ShopServiceError>;
    async fn list_by_product(&self, product_id: Uuid) -> Result<Vec<Review>, ShopServiceError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Review>, ShopServiceError>;
    /// Fails with `ReviewAlreadyExists` when the user already reviewed the product.
    async fn create(&self, review: &Review) -> Result<(), ShopServiceError>;
    async fn update(&self, review: &Review) -> Result<(), ShopServiceError>;
    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError>;
}

pub trait AddressRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, ShopServiceError>;
    /// Oldest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Address>, ShopServiceError>;
    async fn find_default(&self, user_id: Uuid) -> Result<Option<Address>, ShopServiceError>;
    /// Insert the address and return the stored row. A default insert that
    /// loses to another live default of the same user is stored as non-default.
    async fn create(&self, address: &Address) -> Result<Address, ShopServiceError>;
    /// Overwrite the mutable fields. Owner and default flag are untouched.
    async fn update(&self, address: &Address) -> Result<(), ShopServiceError>;
    /// Soft-delete the address and, if it was the default, promote the oldest
    /// remaining address, atomically. Returns `false` if nothing was deleted.
    async fn delete_and_promote(&self, user_id: Uuid, id: Uuid) -> Result<bool, ShopServiceError>;
    /// Make `id` the user's only default address, atomically.
    async fn set_default(&self, user_id: Uuid, id: Uuid) -> Result<(), ShopServiceError>;
}
