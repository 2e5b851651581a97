use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, SqlErr, TransactionError, TransactionTrait,
    UpdateMany,
    sea_query::{Expr, OnConflict, extension::postgres::PgExpr},
};
use uuid::Uuid;

use bazaar_domain::order::OrderStatus;
use bazaar_domain::pagination::{Page, PageRequest, Sort};
use bazaar_domain::product::ProductSortBy;
use bazaar_shop_schema::{
    addresses, cart_items, carts, categories, images, order_items, orders, products, reviews,
    users,
};

use crate::domain::repository::{
    AddressRepository, CartRepository, CategoryRepository, OrderRepository, ProductRepository,
    ReviewRepository, UserRepository,
};
use crate::domain::types::{
    Address, Cart, CartItem, Category, Order, OrderItem, Product, ProductFilter, ProductImage,
    Review, User,
};
use crate::error::ShopServiceError;

/// Map a unique-index violation to `conflict`, anything else to `Internal`.
fn conflict_or_internal(
    err: DbErr,
    conflict: ShopServiceError,
    context: &'static str,
) -> ShopServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict,
        _ => anyhow::Error::new(err).context(context).into(),
    }
}

fn from_transaction(err: TransactionError<ShopServiceError>) -> ShopServiceError {
    match err {
        TransactionError::Connection(e) => anyhow::Error::new(e).context("begin transaction").into(),
        TransactionError::Transaction(e) => e,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

/// Profile columns written by a user update, role included.
fn user_update(user: &User) -> UpdateMany<users::Entity> {
    users::Entity::update_many()
        .col_expr(users::Column::Email, Expr::value(user.email.clone()))
        .col_expr(users::Column::Name, Expr::value(user.name.clone()))
        .col_expr(
            users::Column::PasswordHash,
            Expr::value(user.password_hash.clone()),
        )
        .col_expr(users::Column::Role, Expr::value(user.role.as_str()))
        .col_expr(users::Column::UpdatedAt, Expr::value(user.updated_at))
        .filter(users::Column::Id.eq(user.id))
        .filter(users::Column::DeletedAt.is_null())
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ShopServiceError> {
        let model = users::Entity::find_by_id(id)
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ShopServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), ShopServiceError> {
        users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            name: Set(user.name.clone()),
            role: Set(user.role.as_str().to_owned()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            conflict_or_internal(e, ShopServiceError::EmailAlreadyRegistered, "create user")
        })?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), ShopServiceError> {
        user_update(user)
            .exec(&self.db)
            .await
            .map_err(|e| {
                conflict_or_internal(e, ShopServiceError::EmailAlreadyRegistered, "update user")
            })?;
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("soft delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> Result<User, ShopServiceError> {
    Ok(User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        name: model.name,
        role: model.role.parse().context("decode user role")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, ShopServiceError> {
        let model = categories::Entity::find_by_id(id)
            .filter(categories::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find category by id")?;
        Ok(model.map(category_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, ShopServiceError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .filter(categories::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find category by name")?;
        Ok(model.map(category_from_model))
    }

    async fn list(&self) -> Result<Vec<Category>, ShopServiceError> {
        let models = categories::Entity::find()
            .filter(categories::Column::DeletedAt.is_null())
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn create(&self, category: &Category) -> Result<(), ShopServiceError> {
        categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            created_at: Set(category.created_at),
            updated_at: Set(category.updated_at),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            conflict_or_internal(e, ShopServiceError::CategoryAlreadyExists, "create category")
        })?;
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), ShopServiceError> {
        categories::Entity::update_many()
            .col_expr(categories::Column::Name, Expr::value(category.name.clone()))
            .col_expr(
                categories::Column::Description,
                Expr::value(category.description.clone()),
            )
            .col_expr(categories::Column::UpdatedAt, Expr::value(category.updated_at))
            .filter(categories::Column::Id.eq(category.id))
            .filter(categories::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| {
                conflict_or_internal(e, ShopServiceError::CategoryAlreadyExists, "update category")
            })?;
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let result = categories::Entity::update_many()
            .col_expr(categories::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("soft delete category")?;
        Ok(result.rows_affected > 0)
    }

    async fn has_products(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let count = products::Entity::find()
            .filter(products::Column::CategoryId.eq(id))
            .filter(products::Column::DeletedAt.is_null())
            .count(&self.db)
            .await
            .context("count category products")?;
        Ok(count > 0)
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

/// Escape `%`, `_` and `\` so user search text matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn filtered_products(filter: &ProductFilter) -> Select<products::Entity> {
    let mut query = products::Entity::find().filter(products::Column::DeletedAt.is_null());
    if let Some(category_id) = filter.category_id {
        query = query.filter(products::Column::CategoryId.eq(category_id));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(products::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(products::Column::Price.lte(max));
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        query = query.filter(
            Condition::any()
                .add(Expr::col(products::Column::Name).ilike(pattern.clone()))
                .add(Expr::col(products::Column::Description).ilike(pattern)),
        );
    }
    query
}

impl ProductRepository for DbProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ShopServiceError> {
        let model = products::Entity::find_by_id(id)
            .filter(products::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find product by id")?;
        Ok(model.map(product_from_model))
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, ShopServiceError> {
        let page = page.clamped();
        let total = filtered_products(filter)
            .count(&self.db)
            .await
            .context("count products")?;

        let query = filtered_products(filter);
        let query = match filter.sort_by {
            ProductSortBy::CreatedAt(Sort::Desc) => {
                query.order_by_desc(products::Column::CreatedAt)
            }
            ProductSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(products::Column::CreatedAt),
            ProductSortBy::Price(Sort::Desc) => query.order_by_desc(products::Column::Price),
            ProductSortBy::Price(Sort::Asc) => query.order_by_asc(products::Column::Price),
        };
        let models = query
            .order_by_asc(products::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list products")?;

        Ok(Page::new(
            models.into_iter().map(product_from_model).collect(),
            page,
            total,
        ))
    }

    async fn create(&self, product: &Product) -> Result<(), ShopServiceError> {
        products::ActiveModel {
            id: Set(product.id),
            name: Set(product.name.clone()),
            description: Set(product.description.clone()),
            price: Set(product.price),
            stock: Set(product.stock),
            sku: Set(product.sku.clone()),
            category_id: Set(product.category_id),
            is_active: Set(product.is_active),
            created_at: Set(product.created_at),
            updated_at: Set(product.updated_at),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| conflict_or_internal(e, ShopServiceError::SkuAlreadyExists, "create product"))?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), ShopServiceError> {
        products::Entity::update_many()
            .col_expr(products::Column::Name, Expr::value(product.name.clone()))
            .col_expr(
                products::Column::Description,
                Expr::value(product.description.clone()),
            )
            .col_expr(products::Column::Price, Expr::value(product.price))
            .col_expr(products::Column::Stock, Expr::value(product.stock))
            .col_expr(products::Column::Sku, Expr::value(product.sku.clone()))
            .col_expr(products::Column::CategoryId, Expr::value(product.category_id))
            .col_expr(products::Column::IsActive, Expr::value(product.is_active))
            .col_expr(products::Column::UpdatedAt, Expr::value(product.updated_at))
            .filter(products::Column::Id.eq(product.id))
            .filter(products::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, ShopServiceError::SkuAlreadyExists, "update product"))?;
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let result = products::Entity::update_many()
            .col_expr(products::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(products::Column::Id.eq(id))
            .filter(products::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("soft delete product")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>, ShopServiceError> {
        let models = images::Entity::find()
            .filter(images::Column::ProductId.eq(product_id))
            .filter(images::Column::DeletedAt.is_null())
            .order_by_desc(images::Column::IsPrimary)
            .order_by_asc(images::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list product images")?;
        Ok(models.into_iter().map(image_from_model).collect())
    }

    async fn add_image(&self, image: &ProductImage) -> Result<(), ShopServiceError> {
        self.db
            .transaction::<_, (), ShopServiceError>(|txn| {
                let image = image.clone();
                Box::pin(async move {
                    if image.is_primary {
                        images::Entity::update_many()
                            .col_expr(images::Column::IsPrimary, Expr::value(false))
                            .filter(images::Column::ProductId.eq(image.product_id))
                            .filter(images::Column::IsPrimary.eq(true))
                            .exec(txn)
                            .await
                            .context("clear primary image")?;
                    }
                    images::ActiveModel {
                        id: Set(image.id),
                        product_id: Set(image.product_id),
                        url: Set(image.url.clone()),
                        alt_text: Set(image.alt_text.clone()),
                        is_primary: Set(image.is_primary),
                        created_at: Set(image.created_at),
                        updated_at: Set(image.created_at),
                        deleted_at: Set(None),
                    }
                    .insert(txn)
                    .await
                    .context("insert product image")?;
                    Ok(())
                })
            })
            .await
            .map_err(from_transaction)
    }

    async fn remove_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<bool, ShopServiceError> {
        self.db
            .transaction::<_, bool, ShopServiceError>(|txn| {
                Box::pin(async move {
                    let Some(target) = images::Entity::find_by_id(image_id)
                        .filter(images::Column::ProductId.eq(product_id))
                        .filter(images::Column::DeletedAt.is_null())
                        .one(txn)
                        .await
                        .context("find product image")?
                    else {
                        return Ok(false);
                    };

                    images::Entity::update_many()
                        .col_expr(images::Column::DeletedAt, Expr::value(Utc::now()))
                        .col_expr(images::Column::IsPrimary, Expr::value(false))
                        .filter(images::Column::Id.eq(target.id))
                        .exec(txn)
                        .await
                        .context("remove product image")?;

                    if target.is_primary {
                        let next = images::Entity::find()
                            .filter(images::Column::ProductId.eq(product_id))
                            .filter(images::Column::DeletedAt.is_null())
                            .order_by_asc(images::Column::CreatedAt)
                            .order_by_asc(images::Column::Id)
                            .one(txn)
                            .await
                            .context("find image to promote")?;
                        if let Some(next) = next {
                            images::Entity::update_many()
                                .col_expr(images::Column::IsPrimary, Expr::value(true))
                                .filter(images::Column::Id.eq(next.id))
                                .exec(txn)
                                .await
                                .context("promote primary image")?;
                        }
                    }
                    Ok(true)
                })
            })
            .await
            .map_err(from_transaction)
    }
}

fn product_from_model(model: products::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        sku: model.sku,
        category_id: model.category_id,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn image_from_model(model: images::Model) -> ProductImage {
    ProductImage {
        id: model.id,
        product_id: model.product_id,
        url: model.url,
        alt_text: model.alt_text,
        is_primary: model.is_primary,
        created_at: model.created_at,
    }
}

// ── Cart repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

impl CartRepository for DbCartRepository {
    async fn get_or_create(&self, user_id: Uuid) -> Result<Cart, ShopServiceError> {
        let now = Utc::now();
        carts::Entity::insert(carts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        })
        .on_conflict(
            OnConflict::column(carts::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("ensure cart")?;

        let cart = self
            .find_by_user(user_id)
            .await?
            .context("cart missing after upsert")?;
        Ok(cart)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ShopServiceError> {
        let Some(cart) = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find cart by user")?
        else {
            return Ok(None);
        };

        let items = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list cart items")?;

        Ok(Some(Cart {
            id: cart.id,
            user_id: cart.user_id,
            items: items.into_iter().map(cart_item_from_model).collect(),
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }))
    }

    async fn find_item(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<CartItem>, ShopServiceError> {
        let model = cart_items::Entity::find_by_id(item_id)
            .filter(cart_items::Column::CartId.eq(cart_id))
            .one(&self.db)
            .await
            .context("find cart item")?;
        Ok(model.map(cart_item_from_model))
    }

    async fn find_item_by_product(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, ShopServiceError> {
        let model = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await
            .context("find cart item by product")?;
        Ok(model.map(cart_item_from_model))
    }

    async fn insert_item(&self, item: &CartItem) -> Result<(), ShopServiceError> {
        cart_items::ActiveModel {
            id: Set(item.id),
            cart_id: Set(item.cart_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            price: Set(item.price),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
        }
        .insert(&self.db)
        .await
        .context("insert cart item")?;
        Ok(())
    }

    async fn update_item(&self, item: &CartItem) -> Result<(), ShopServiceError> {
        cart_items::Entity::update_many()
            .col_expr(cart_items::Column::Quantity, Expr::value(item.quantity))
            .col_expr(cart_items::Column::Price, Expr::value(item.price))
            .col_expr(cart_items::Column::UpdatedAt, Expr::value(item.updated_at))
            .filter(cart_items::Column::Id.eq(item.id))
            .filter(cart_items::Column::CartId.eq(item.cart_id))
            .exec(&self.db)
            .await
            .context("update cart item")?;
        Ok(())
    }

    async fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, ShopServiceError> {
        let result = cart_items::Entity::delete_many()
            .filter(cart_items::Column::Id.eq(item_id))
            .filter(cart_items::Column::CartId.eq(cart_id))
            .exec(&self.db)
            .await
            .context("remove cart item")?;
        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, cart_id: Uuid) -> Result<(), ShopServiceError> {
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .exec(&self.db)
            .await
            .context("clear cart")?;
        Ok(())
    }
}

fn cart_item_from_model(model: cart_items::Model) -> CartItem {
    CartItem {
        id: model.id,
        cart_id: model.cart_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl DbOrderRepository {
    /// Attach items to a page of order rows with a single query.
    async fn with_items(&self, models: Vec<orders::Model>) -> Result<Vec<Order>, ShopServiceError> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        if !ids.is_empty() {
            let items = order_items::Entity::find()
                .filter(order_items::Column::OrderId.is_in(ids))
                .order_by_asc(order_items::Column::CreatedAt)
                .all(&self.db)
                .await
                .context("list order items")?;
            for item in items {
                items_by_order
                    .entry(item.order_id)
                    .or_default()
                    .push(order_item_from_model(item));
            }
        }

        models
            .into_iter()
            .map(|model| {
                let items = items_by_order.remove(&model.id).unwrap_or_default();
                order_from_model(model, items)
            })
            .collect()
    }

    async fn page(
        &self,
        query: Select<orders::Entity>,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError> {
        let page = page.clamped();
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count orders")?;
        let models = query
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list orders")?;
        Ok(Page::new(self.with_items(models).await?, page, total))
    }
}

async fn restore_stock<C: ConnectionTrait>(txn: &C, order_id: Uuid) -> Result<(), ShopServiceError> {
    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .all(txn)
        .await
        .context("load items for stock restore")?;
    for item in items {
        products::Entity::update_many()
            .col_expr(
                products::Column::Stock,
                Expr::col(products::Column::Stock).add(item.quantity),
            )
            .filter(products::Column::Id.eq(item.product_id))
            .exec(txn)
            .await
            .context("restore product stock")?;
    }
    Ok(())
}

/// Order lines sorted by product id, so concurrent checkouts lock product
/// rows in the same order.
fn reservation_order(items: &[OrderItem]) -> Vec<&OrderItem> {
    let mut lines: Vec<&OrderItem> = items.iter().collect();
    lines.sort_by_key(|item| item.product_id);
    lines
}

impl OrderRepository for DbOrderRepository {
    async fn place(&self, order: &Order, cart_id: Uuid) -> Result<(), ShopServiceError> {
        self.db
            .transaction::<_, (), ShopServiceError>(|txn| {
                let order = order.clone();
                Box::pin(async move {
                    // Conditional decrement: a row is touched only if enough stock remains.
                    for item in reservation_order(&order.items) {
                        let reserved = products::Entity::update_many()
                            .col_expr(
                                products::Column::Stock,
                                Expr::col(products::Column::Stock).sub(item.quantity),
                            )
                            .filter(products::Column::Id.eq(item.product_id))
                            .filter(products::Column::DeletedAt.is_null())
                            .filter(products::Column::Stock.gte(item.quantity))
                            .exec(txn)
                            .await
                            .context("reserve product stock")?;
                        if reserved.rows_affected == 0 {
                            return Err(ShopServiceError::InsufficientStock);
                        }
                    }

                    orders::ActiveModel {
                        id: Set(order.id),
                        user_id: Set(order.user_id),
                        status: Set(order.status.as_str().to_owned()),
                        total_amount: Set(order.total_amount),
                        shipping_address_id: Set(order.shipping_address_id),
                        payment_id: Set(order.payment_id.clone()),
                        tracking_number: Set(order.tracking_number.clone()),
                        notes: Set(order.notes.clone()),
                        created_at: Set(order.created_at),
                        updated_at: Set(order.updated_at),
                        deleted_at: Set(None),
                    }
                    .insert(txn)
                    .await
                    .context("insert order")?;

                    for item in &order.items {
                        order_items::ActiveModel {
                            id: Set(item.id),
                            order_id: Set(order.id),
                            product_id: Set(item.product_id),
                            quantity: Set(item.quantity),
                            price: Set(item.price),
                            created_at: Set(order.created_at),
                            updated_at: Set(order.created_at),
                        }
                        .insert(txn)
                        .await
                        .context("insert order item")?;
                    }

                    cart_items::Entity::delete_many()
                        .filter(cart_items::Column::CartId.eq(cart_id))
                        .exec(txn)
                        .await
                        .context("drain cart")?;
                    Ok(())
                })
            })
            .await
            .map_err(from_transaction)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ShopServiceError> {
        let Some(model) = orders::Entity::find_by_id(id)
            .filter(orders::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find order by id")?
        else {
            return Ok(None);
        };
        Ok(self.with_items(vec![model]).await?.pop())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError> {
        let query = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .filter(orders::Column::DeletedAt.is_null());
        self.page(query, page).await
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, ShopServiceError> {
        let mut query = orders::Entity::find().filter(orders::Column::DeletedAt.is_null());
        if let Some(status) = status {
            query = query.filter(orders::Column::Status.eq(status.as_str()));
        }
        self.page(query, page).await
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<bool, ShopServiceError> {
        let tracking_number = tracking_number.map(str::to_owned);
        self.db
            .transaction::<_, bool, ShopServiceError>(|txn| {
                Box::pin(async move {
                    let mut update = orders::Entity::update_many()
                        .col_expr(orders::Column::Status, Expr::value(to.as_str()))
                        .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(orders::Column::Id.eq(id))
                        .filter(orders::Column::Status.eq(from.as_str()))
                        .filter(orders::Column::DeletedAt.is_null());
                    if let Some(tracking_number) = tracking_number {
                        update = update
                            .col_expr(orders::Column::TrackingNumber, Expr::value(tracking_number));
                    }
                    let result = update.exec(txn).await.context("transition order")?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    if to == OrderStatus::Cancelled {
                        restore_stock(txn, id).await?;
                    }
                    Ok(true)
                })
            })
            .await
            .map_err(from_transaction)
    }

    async fn has_delivered_purchase(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, ShopServiceError> {
        let count = order_items::Entity::find()
            .join(JoinType::InnerJoin, order_items::Relation::Order.def())
            .filter(order_items::Column::ProductId.eq(product_id))
            .filter(orders::Column::UserId.eq(user_id))
            .filter(orders::Column::Status.eq(OrderStatus::Delivered.as_str()))
            .filter(orders::Column::DeletedAt.is_null())
            .count(&self.db)
            .await
            .context("check delivered purchase")?;
        Ok(count > 0)
    }
}

fn order_from_model(
    model: orders::Model,
    items: Vec<OrderItem>,
) -> Result<Order, ShopServiceError> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        status: model.status.parse().context("decode order status")?,
        total_amount: model.total_amount,
        shipping_address_id: model.shipping_address_id,
        payment_id: model.payment_id,
        tracking_number: model.tracking_number,
        notes: model.notes,
        items,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn order_item_from_model(model: order_items::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
    }
}

// ── Review repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReviewRepository {
    pub db: DatabaseConnection,
}

impl ReviewRepository for DbReviewRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, ShopServiceError> {
        let model = reviews::Entity::find_by_id(id)
            .filter(reviews::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find review by id")?;
        Ok(model.map(review_from_model))
    }

    async fn find_by_user_and_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Review>, ShopServiceError> {
        let model = reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .filter(reviews::Column::ProductId.eq(product_id))
            .filter(reviews::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find review by user and product")?;
        Ok(model.map(review_from_model))
    }

    async fn list_by_product(&self, product_id: Uuid) -> Result<Vec<Review>, ShopServiceError> {
        let models = reviews::Entity::find()
            .filter(reviews::Column::ProductId.eq(product_id))
            .filter(reviews::Column::DeletedAt.is_null())
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list product reviews")?;
        Ok(models.into_iter().map(review_from_model).collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Review>, ShopServiceError> {
        let models = reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .filter(reviews::Column::DeletedAt.is_null())
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list user reviews")?;
        Ok(models.into_iter().map(review_from_model).collect())
    }

    async fn create(&self, review: &Review) -> Result<(), ShopServiceError> {
        reviews::ActiveModel {
            id: Set(review.id),
            user_id: Set(review.user_id),
            product_id: Set(review.product_id),
            rating: Set(review.rating),
            title: Set(review.title.clone()),
            comment: Set(review.comment.clone()),
            is_verified: Set(review.is_verified),
            created_at: Set(review.created_at),
            updated_at: Set(review.updated_at),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            conflict_or_internal(e, ShopServiceError::ReviewAlreadyExists, "create review")
        })?;
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<(), ShopServiceError> {
        reviews::Entity::update_many()
            .col_expr(reviews::Column::Rating, Expr::value(review.rating))
            .col_expr(reviews::Column::Title, Expr::value(review.title.clone()))
            .col_expr(reviews::Column::Comment, Expr::value(review.comment.clone()))
            .col_expr(reviews::Column::UpdatedAt, Expr::value(review.updated_at))
            .filter(reviews::Column::Id.eq(review.id))
            .filter(reviews::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("update review")?;
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, ShopServiceError> {
        let result = reviews::Entity::update_many()
            .col_expr(reviews::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(reviews::Column::Id.eq(id))
            .filter(reviews::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("soft delete review")?;
        Ok(result.rows_affected > 0)
    }
}

fn review_from_model(model: reviews::Model) -> Review {
    Review {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        rating: model.rating,
        title: model.title,
        comment: model.comment,
        is_verified: model.is_verified,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Address repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAddressRepository {
    pub db: DatabaseConnection,
}

fn live_addresses(user_id: Uuid) -> Select<addresses::Entity> {
    addresses::Entity::find()
        .filter(addresses::Column::UserId.eq(user_id))
        .filter(addresses::Column::DeletedAt.is_null())
}

impl AddressRepository for DbAddressRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, ShopServiceError> {
        let model = addresses::Entity::find_by_id(id)
            .filter(addresses::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find address by id")?;
        model.map(address_from_model).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Address>, ShopServiceError> {
        let models = live_addresses(user_id)
            .order_by_asc(addresses::Column::CreatedAt)
            .order_by_asc(addresses::Column::Id)
            .all(&self.db)
            .await
            .context("list addresses")?;
        models.into_iter().map(address_from_model).collect()
    }

    async fn find_default(&self, user_id: Uuid) -> Result<Option<Address>, ShopServiceError> {
        let model = live_addresses(user_id)
            .filter(addresses::Column::IsDefault.eq(true))
            .one(&self.db)
            .await
            .context("find default address")?;
        model.map(address_from_model).transpose()
    }

    async fn create(&self, address: &Address) -> Result<Address, ShopServiceError> {
        match address_active_model(address).insert(&self.db).await {
            Ok(_) => Ok(address.clone()),
            // uq_addresses_default_live: another default won the race.
            Err(e)
                if address.is_default
                    && matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                let address = Address {
                    is_default: false,
                    ..address.clone()
                };
                address_active_model(&address)
                    .insert(&self.db)
                    .await
                    .context("create non-default address")?;
                Ok(address)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create address").into()),
        }
    }

    async fn update(&self, address: &Address) -> Result<(), ShopServiceError> {
        addresses::Entity::update_many()
            .col_expr(
                addresses::Column::AddressType,
                Expr::value(address.address_type.as_str()),
            )
            .col_expr(addresses::Column::Street, Expr::value(address.street.clone()))
            .col_expr(addresses::Column::City, Expr::value(address.city.clone()))
            .col_expr(addresses::Column::State, Expr::value(address.state.clone()))
            .col_expr(addresses::Column::Country, Expr::value(address.country.clone()))
            .col_expr(addresses::Column::ZipCode, Expr::value(address.zip_code.clone()))
            .col_expr(addresses::Column::UpdatedAt, Expr::value(address.updated_at))
            .filter(addresses::Column::Id.eq(address.id))
            .filter(addresses::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("update address")?;
        Ok(())
    }

    async fn delete_and_promote(&self, user_id: Uuid, id: Uuid) -> Result<bool, ShopServiceError> {
        self.db
            .transaction::<_, bool, ShopServiceError>(|txn| {
                Box::pin(async move {
                    let Some(target) = live_addresses(user_id)
                        .filter(addresses::Column::Id.eq(id))
                        .one(txn)
                        .await
                        .context("find address for delete")?
                    else {
                        return Ok(false);
                    };

                    addresses::Entity::update_many()
                        .col_expr(addresses::Column::DeletedAt, Expr::value(Utc::now()))
                        .col_expr(addresses::Column::IsDefault, Expr::value(false))
                        .filter(addresses::Column::Id.eq(id))
                        .exec(txn)
                        .await
                        .context("soft delete address")?;

                    if target.is_default {
                        let next = live_addresses(user_id)
                            .order_by_asc(addresses::Column::CreatedAt)
                            .order_by_asc(addresses::Column::Id)
                            .one(txn)
                            .await
                            .context("find address to promote")?;
                        if let Some(next) = next {
                            addresses::Entity::update_many()
                                .col_expr(addresses::Column::IsDefault, Expr::value(true))
                                .filter(addresses::Column::Id.eq(next.id))
                                .exec(txn)
                                .await
                                .context("promote default address")?;
                        }
                    }
                    Ok(true)
                })
            })
            .await
            .map_err(from_transaction)
    }

    async fn set_default(&self, user_id: Uuid, id: Uuid) -> Result<(), ShopServiceError> {
        self.db
            .transaction::<_, (), ShopServiceError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    addresses::Entity::update_many()
                        .col_expr(addresses::Column::IsDefault, Expr::value(false))
                        .col_expr(addresses::Column::UpdatedAt, Expr::value(now))
                        .filter(addresses::Column::UserId.eq(user_id))
                        .filter(addresses::Column::IsDefault.eq(true))
                        .filter(addresses::Column::Id.ne(id))
                        .exec(txn)
                        .await
                        .context("clear default address")?;
                    addresses::Entity::update_many()
                        .col_expr(addresses::Column::IsDefault, Expr::value(true))
                        .col_expr(addresses::Column::UpdatedAt, Expr::value(now))
                        .filter(addresses::Column::Id.eq(id))
                        .filter(addresses::Column::UserId.eq(user_id))
                        .filter(addresses::Column::DeletedAt.is_null())
                        .exec(txn)
                        .await
                        .context("set default address")?;
                    Ok(())
                })
            })
            .await
            .map_err(from_transaction)
    }
}

fn address_active_model(address: &Address) -> addresses::ActiveModel {
    addresses::ActiveModel {
        id: Set(address.id),
        user_id: Set(address.user_id),
        address_type: Set(address.address_type.as_str().to_owned()),
        street: Set(address.street.clone()),
        city: Set(address.city.clone()),
        state: Set(address.state.clone()),
        country: Set(address.country.clone()),
        zip_code: Set(address.zip_code.clone()),
        is_default: Set(address.is_default),
        created_at: Set(address.created_at),
        updated_at: Set(address.updated_at),
        deleted_at: Set(None),
    }
}

fn address_from_model(model: addresses::Model) -> Result<Address, ShopServiceError> {
    Ok(Address {
        id: model.id,
        user_id: model.user_id,
        address_type: model.address_type.parse().context("decode address type")?,
        street: model.street,
        city: model.city,
        state: model.state,
        country: model.country,
        zip_code: model.zip_code,
        is_default: model.is_default,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
