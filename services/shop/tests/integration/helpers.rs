use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use bazaar_domain::order::OrderStatus;
use bazaar_domain::pagination::{Page, PageRequest, Sort};
use bazaar_domain::product::ProductSortBy;
use bazaar_shop::domain::repository::{
    AddressRepository, CartRepository, CategoryRepository, OrderRepository, ProductRepository,
    ReviewRepository, UserRepository,
};
use bazaar_shop::domain::types::{
    Address, Cart, CartItem, Category, Order, Product, ProductFilter, ProductImage, Review, User,
};
use bazaar_shop::error::ShopServiceError;

// ── InMemoryShop ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub images: Vec<ProductImage>,
    pub carts: Vec<Cart>,
    pub cart_items: Vec<CartItem>,
    pub orders: Vec<Order>,
    pub reviews: Vec<Review>,
    pub addresses: Vec<Address>,
}

/// One shared store behind every repository port. Clones share state, so a
/// use case can take `shop.clone()` for each of its ports.
#[derive(Clone, Default)]
pub struct InMemoryShop {
    store: Arc<Mutex<Store>>,
}

impl InMemoryShop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    pub fn seed_category(&self, name: &str) -> Category {
        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.lock().categories.push(category.clone());
        category
    }

    pub fn seed_product(&self, name: &str, price: &str, stock: i32) -> Product {
        let category_id = self.seed_category(&format!("{name} category")).id;
        let now = Utc::now();
        let product = Product {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            description: String::new(),
            price: Decimal::from_str(price).unwrap(),
            stock,
            sku: None,
            category_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.lock().products.push(product.clone());
        product
    }

    pub fn stock_of(&self, product_id: Uuid) -> i32 {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.stock)
            .unwrap()
    }

    pub fn cart_count(&self) -> usize {
        self.lock().carts.len()
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn status_of(&self, order_id: Uuid) -> OrderStatus {
        self.lock()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.status)
            .unwrap()
    }

    /// Force an order into a status, bypassing the transition rules.
    pub fn force_status(&self, order_id: Uuid, status: OrderStatus) {
        let mut store = self.lock();
        if let Some(order) = store.orders.iter_mut().find(|o| o.id == order_id) {
            order.status = status;
        }
    }

    fn cart_with_items(store: &Store, cart: &Cart) -> Cart {
        Cart {
            items: store
                .cart_items
                .iter()
                .filter(|i| i.cart_id == cart.id)
                .cloned()
                .collect(),
            ..cart.clone()
        }
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let page = page.clamped();
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page::new(items, page, total)
}

impl UserRepository for InMemoryShop {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ShopServiceError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ShopServiceError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), ShopServiceError> {
        let mut store = self.lock();
        if store.users.iter().any(|u| u.email == user.email) {
            return Err(ShopServiceError::EmailAlreadyRegistered);
        }
        store.users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), ShopServiceError> {
        let mut store = self.lock();
        if store
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(ShopServiceError::EmailAlreadyRegistered);
        }
        if let Some(slot) = store.users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let mut store = self.lock();
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        Ok(store.users.len() < before)
    }
}

impl CategoryRepository for InMemoryShop {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, ShopServiceError> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, ShopServiceError> {
        Ok(self.lock().categories.iter().find(|c| c.name == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, ShopServiceError> {
        Ok(self.lock().categories.clone())
    }

    async fn create(&self, category: &Category) -> Result<(), ShopServiceError> {
        self.lock().categories.push(category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), ShopServiceError> {
        if let Some(slot) = self
            .lock()
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
        {
            *slot = category.clone();
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let mut store = self.lock();
        let before = store.categories.len();
        store.categories.retain(|c| c.id != id);
        Ok(store.categories.len() < before)
    }

    async fn has_products(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        Ok(self.lock().products.iter().any(|p| p.category_id == id))
    }
}

impl ProductRepository for InMemoryShop {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ShopServiceError> {
        Ok(self.lock().products.iter().find(|p| p.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, ShopServiceError> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut products: Vec<Product> = self
            .lock()
            .products
            .iter()
            .filter(|p| filter.category_id.is_none_or(|id| p.category_id == id))
            .filter(|p| filter.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| filter.max_price.is_none_or(|max| p.price <= max))
            .filter(|p| {
                search.as_deref().is_none_or(|s| {
                    p.name.to_lowercase().contains(s) || p.description.to_lowercase().contains(s)
                })
            })
            .cloned()
            .collect();
        match filter.sort_by {
            ProductSortBy::CreatedAt(Sort::Desc) => {
                products.sort_by(|a, b| b.created_at.cmp(&a.created_at))
            }
            ProductSortBy::CreatedAt(Sort::Asc) => {
                products.sort_by(|a, b| a.created_at.cmp(&b.created_at))
            }
            ProductSortBy::Price(Sort::Desc) => products.sort_by(|a, b| b.price.cmp(&a.price)),
            ProductSortBy::Price(Sort::Asc) => products.sort_by(|a, b| a.price.cmp(&b.price)),
        }
        Ok(paginate(products, page))
    }

    async fn create(&self, product: &Product) -> Result<(), ShopServiceError> {
        let mut store = self.lock();
        if product.sku.is_some() && store.products.iter().any(|p| p.sku == product.sku) {
            return Err(ShopServiceError::SkuAlreadyExists);
        }
        store.products.push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), ShopServiceError> {
        if let Some(slot) = self
            .lock()
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
        {
            *slot = product.clone();
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let mut store = self.lock();
        let before = store.products.len();
        store.products.retain(|p| p.id != id);
        Ok(store.products.len() < before)
    }

    async fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>, ShopServiceError> {
        Ok(self
            .lock()
            .images
            .iter()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn add_image(&self, image: &ProductImage) -> Result<(), ShopServiceError> {
        let mut store = self.lock();
        if image.is_primary {
            for other in store
                .images
                .iter_mut()
                .filter(|i| i.product_id == image.product_id)
            {
                other.is_primary = false;
            }
        }
        store.images.push(image.clone());
        Ok(())
    }

    async fn remove_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<bool, ShopServiceError> {
        let mut store = self.lock();
        let Some(pos) = store
            .images
            .iter()
            .position(|i| i.id == image_id && i.product_id == product_id)
        else {
            return Ok(false);
        };
        let removed = store.images.remove(pos);
        if removed.is_primary {
            if let Some(next) = store.images.iter_mut().find(|i| i.product_id == product_id) {
                next.is_primary = true;
            }
        }
        Ok(true)
    }
}

impl CartRepository for InMemoryShop {
    async fn get_or_create(&self, user_id: Uuid) -> Result<Cart, ShopServiceError> {
        let mut store = self.lock();
        if let Some(cart) = store.carts.iter().find(|c| c.user_id == user_id) {
            return Ok(Self::cart_with_items(&store, cart));
        }
        let now = Utc::now();
        let cart = Cart {
            id: Uuid::now_v7(),
            user_id,
            items: vec![],
            created_at: now,
            updated_at: now,
        };
        store.carts.push(cart.clone());
        Ok(cart)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ShopServiceError> {
        let store = self.lock();
        Ok(store
            .carts
            .iter()
            .find(|c| c.user_id == user_id)
            .map(|cart| Self::cart_with_items(&store, cart)))
    }

    async fn find_item(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<CartItem>, ShopServiceError> {
        Ok(self
            .lock()
            .cart_items
            .iter()
            .find(|i| i.cart_id == cart_id && i.id == item_id)
            .cloned())
    }

    async fn find_item_by_product(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, ShopServiceError> {
        Ok(self
            .lock()
            .cart_items
            .iter()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
            .cloned())
    }

    async fn insert_item(&self, item: &CartItem) -> Result<(), ShopServiceError> {
        self.lock().cart_items.push(item.clone());
        Ok(())
    }

    async fn update_item(&self, item: &CartItem) -> Result<(), ShopServiceError> {
        if let Some(slot) = self
            .lock()
            .cart_items
            .iter_mut()
            .find(|i| i.id == item.id && i.cart_id == item.cart_id)
        {
            slot.quantity = item.quantity;
            slot.price = item.price;
            slot.updated_at = item.updated_at;
        }
        Ok(())
    }

    async fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, ShopServiceError> {
        let mut store = self.lock();
        let before = store.cart_items.len();
        store
            .cart_items
            .retain(|i| !(i.cart_id == cart_id && i.id == item_id));
        Ok(store.cart_items.len() < before)
    }

    async fn clear(&self, cart_id: Uuid) -> Result<(), ShopServiceError> {
        self.lock().cart_items.retain(|i| i.cart_id != cart_id);
        Ok(())
    }
}

impl OrderRepository for InMemoryShop {
    async fn place(&self, order: &Order, cart_id: Uuid) -> Result<(), ShopServiceError> {
        let mut store = self.lock();
        let reservable = order.items.iter().all(|item| {
            store
                .products
                .iter()
                .any(|p| p.id == item.product_id && p.stock >= item.quantity)
        });
        if !reservable {
            return Err(ShopServiceError::InsufficientStock);
        }
        for item in &order.items {
            if let Some(product) = store.products.iter_mut().find(|p| p.id == item.product_id) {
                product.stock -= item.quantity;
            }
        }
        store.orders.push(order.clone());
        store.cart_items.retain(|i| i.cart_id != cart_id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ShopServiceError> {
        Ok(self.lock().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError> {
        let orders = self
            .lock()
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        Ok(paginate(orders, page))
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError> {
        let orders = self
            .lock()
            .orders
            .iter()
            .rev()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        Ok(paginate(orders, page))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<bool, ShopServiceError> {
        let mut store = self.lock();
        let Some(order) = store
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == from)
        else {
            return Ok(false);
        };
        order.status = to;
        order.updated_at = Utc::now();
        if let Some(tracking_number) = tracking_number {
            order.tracking_number = Some(tracking_number.to_owned());
        }
        if to == OrderStatus::Cancelled {
            let items = order.items.clone();
            for item in items {
                if let Some(product) = store.products.iter_mut().find(|p| p.id == item.product_id) {
                    product.stock += item.quantity;
                }
            }
        }
        Ok(true)
    }

    async fn has_delivered_purchase(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, ShopServiceError> {
        Ok(self.lock().orders.iter().any(|o| {
            o.user_id == user_id
                && o.status == OrderStatus::Delivered
                && o.items.iter().any(|i| i.product_id == product_id)
        }))
    }
}

impl ReviewRepository for InMemoryShop {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, ShopServiceError> {
        Ok(self.lock().reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_user_and_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Review>, ShopServiceError> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.product_id == product_id)
            .cloned())
    }

    async fn list_by_product(&self, product_id: Uuid) -> Result<Vec<Review>, ShopServiceError> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Review>, ShopServiceError> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, review: &Review) -> Result<(), ShopServiceError> {
        let mut store = self.lock();
        if store
            .reviews
            .iter()
            .any(|r| r.user_id == review.user_id && r.product_id == review.product_id)
        {
            return Err(ShopServiceError::ReviewAlreadyExists);
        }
        store.reviews.push(review.clone());
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<(), ShopServiceError> {
        if let Some(slot) = self.lock().reviews.iter_mut().find(|r| r.id == review.id) {
            *slot = review.clone();
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let mut store = self.lock();
        let before = store.reviews.len();
        store.reviews.retain(|r| r.id != id);
        Ok(store.reviews.len() < before)
    }
}

impl AddressRepository for InMemoryShop {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, ShopServiceError> {
        Ok(self.lock().addresses.iter().find(|a| a.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Address>, ShopServiceError> {
        Ok(self
            .lock()
            .addresses
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_default(&self, user_id: Uuid) -> Result<Option<Address>, ShopServiceError> {
        Ok(self
            .lock()
            .addresses
            .iter()
            .find(|a| a.user_id == user_id && a.is_default)
            .cloned())
    }

    async fn create(&self, address: &Address) -> Result<Address, ShopServiceError> {
        let mut store = self.lock();
        let taken = store
            .addresses
            .iter()
            .any(|a| a.user_id == address.user_id && a.is_default);
        let stored = Address {
            is_default: address.is_default && !taken,
            ..address.clone()
        };
        store.addresses.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, address: &Address) -> Result<(), ShopServiceError> {
        if let Some(slot) = self
            .lock()
            .addresses
            .iter_mut()
            .find(|a| a.id == address.id)
        {
            let is_default = slot.is_default;
            *slot = Address {
                is_default,
                ..address.clone()
            };
        }
        Ok(())
    }

    async fn delete_and_promote(&self, user_id: Uuid, id: Uuid) -> Result<bool, ShopServiceError> {
        let mut store = self.lock();
        let Some(pos) = store
            .addresses
            .iter()
            .position(|a| a.id == id && a.user_id == user_id)
        else {
            return Ok(false);
        };
        let removed = store.addresses.remove(pos);
        if removed.is_default {
            if let Some(next) = store.addresses.iter_mut().find(|a| a.user_id == user_id) {
                next.is_default = true;
            }
        }
        Ok(true)
    }

    async fn set_default(&self, user_id: Uuid, id: Uuid) -> Result<(), ShopServiceError> {
        for address in self
            .lock()
            .addresses
            .iter_mut()
            .filter(|a| a.user_id == user_id)
        {
            address.is_default = address.id == id;
        }
        Ok(())
    }
}
