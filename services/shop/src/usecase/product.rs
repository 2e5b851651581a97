use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use bazaar_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::domain::types::{Product, ProductDetail, ProductFilter, ProductImage, non_blank};
use crate::error::ShopServiceError;

/// Field rules every accepted product satisfies.
pub(crate) fn validate_product(product: &Product) -> Result<(), ShopServiceError> {
    if product.name.trim().is_empty() {
        return Err(ShopServiceError::validation("product name is required"));
    }
    if product.price <= Decimal::ZERO {
        return Err(ShopServiceError::validation(
            "product price must be greater than 0",
        ));
    }
    if product.stock < 0 {
        return Err(ShopServiceError::validation("product stock cannot be negative"));
    }
    Ok(())
}

pub(crate) fn validate_price_range(filter: &ProductFilter) -> Result<(), ShopServiceError> {
    if filter.min_price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(ShopServiceError::validation("min price cannot be negative"));
    }
    if filter.max_price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(ShopServiceError::validation("max price cannot be negative"));
    }
    Ok(())
}

fn normalize_sku(sku: Option<String>) -> Option<String> {
    sku.as_deref().and_then(non_blank).map(str::to_owned)
}

async fn ensure_category<C: CategoryRepository>(
    categories: &C,
    category_id: Uuid,
) -> Result<(), ShopServiceError> {
    categories
        .find_by_id(category_id)
        .await?
        .map(|_| ())
        .ok_or(ShopServiceError::CategoryNotFound)
}

// ── CreateProduct ────────────────────────────────────────────────────────────

pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub sku: Option<String>,
    pub category_id: Uuid,
    pub is_active: Option<bool>,
}

pub struct CreateProductUseCase<P: ProductRepository, C: CategoryRepository> {
    pub products: P,
    pub categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> CreateProductUseCase<P, C> {
    pub async fn execute(&self, input: CreateProductInput) -> Result<Product, ShopServiceError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::now_v7(),
            name: input.name.trim().to_owned(),
            description: input.description.unwrap_or_default(),
            price: input.price,
            stock: input.stock,
            sku: normalize_sku(input.sku),
            category_id: input.category_id,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        validate_product(&product)?;
        ensure_category(&self.categories, product.category_id).await?;
        self.products.create(&product).await?;
        Ok(product)
    }
}

// ── GetProduct ───────────────────────────────────────────────────────────────

pub struct GetProductUseCase<P: ProductRepository> {
    pub repo: P,
}

impl<P: ProductRepository> GetProductUseCase<P> {
    pub async fn execute(&self, id: Uuid) -> Result<ProductDetail, ShopServiceError> {
        let product = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ShopServiceError::ProductNotFound)?;
        let images = self.repo.list_images(id).await?;
        Ok(ProductDetail { product, images })
    }
}

// ── ListProducts ─────────────────────────────────────────────────────────────

pub struct ListProductsUseCase<P: ProductRepository> {
    pub repo: P,
}

impl<P: ProductRepository> ListProductsUseCase<P> {
    pub async fn execute(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, ShopServiceError> {
        validate_price_range(&filter)?;
        let filter = ProductFilter {
            search: filter.search.as_deref().and_then(non_blank).map(str::to_owned),
            ..filter
        };
        self.repo.list(&filter, page.clamped()).await
    }
}

// ── UpdateProduct ────────────────────────────────────────────────────────────

/// Partial update. `None` leaves a field unchanged; `Some` is validated and
/// applied, so `stock: Some(0)` empties the stock.
#[derive(Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

pub struct UpdateProductUseCase<P: ProductRepository, C: CategoryRepository> {
    pub products: P,
    pub categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> UpdateProductUseCase<P, C> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<Product, ShopServiceError> {
        let mut product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(ShopServiceError::ProductNotFound)?;

        if let Some(name) = input.name {
            product.name = name.trim().to_owned();
        }
        if let Some(description) = input.description {
            product.description = description;
        }
        if let Some(price) = input.price {
            product.price = price;
        }
        if let Some(stock) = input.stock {
            product.stock = stock;
        }
        if input.sku.is_some() {
            product.sku = normalize_sku(input.sku);
        }
        if let Some(is_active) = input.is_active {
            product.is_active = is_active;
        }
        validate_product(&product)?;

        if let Some(category_id) = input.category_id {
            if category_id != product.category_id {
                ensure_category(&self.categories, category_id).await?;
                product.category_id = category_id;
            }
        }

        product.updated_at = Utc::now();
        self.products.update(&product).await?;
        Ok(product)
    }
}

// ── DeleteProduct ────────────────────────────────────────────────────────────

pub struct DeleteProductUseCase<P: ProductRepository> {
    pub repo: P,
}

impl<P: ProductRepository> DeleteProductUseCase<P> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ShopServiceError> {
        if !self.repo.soft_delete(id).await? {
            return Err(ShopServiceError::ProductNotFound);
        }
        Ok(())
    }
}

// ── AddImage / RemoveImage ───────────────────────────────────────────────────

pub struct AddImageInput {
    pub url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
}

pub struct AddImageUseCase<P: ProductRepository> {
    pub repo: P,
}

impl<P: ProductRepository> AddImageUseCase<P> {
    /// The first image of a product is always primary.
    pub async fn execute(
        &self,
        product_id: Uuid,
        input: AddImageInput,
    ) -> Result<ProductImage, ShopServiceError> {
        let url = non_blank(&input.url)
            .ok_or_else(|| ShopServiceError::validation("image url is required"))?
            .to_owned();
        if self.repo.find_by_id(product_id).await?.is_none() {
            return Err(ShopServiceError::ProductNotFound);
        }
        let existing = self.repo.list_images(product_id).await?;

        let image = ProductImage {
            id: Uuid::now_v7(),
            product_id,
            url,
            alt_text: input.alt_text.unwrap_or_default(),
            is_primary: input.is_primary || existing.is_empty(),
            created_at: Utc::now(),
        };
        self.repo.add_image(&image).await?;
        Ok(image)
    }
}

pub struct RemoveImageUseCase<P: ProductRepository> {
    pub repo: P,
}

impl<P: ProductRepository> RemoveImageUseCase<P> {
    pub async fn execute(&self, product_id: Uuid, image_id: Uuid) -> Result<(), ShopServiceError> {
        if self.repo.find_by_id(product_id).await?.is_none() {
            return Err(ShopServiceError::ProductNotFound);
        }
        if !self.repo.remove_image(product_id, image_id).await? {
            return Err(ShopServiceError::ImageNotFound);
        }
        Ok(())
    }
}
