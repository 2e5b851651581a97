use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_core::envelope::ApiResponse;
use bazaar_domain::pagination::{Page, PageRequest};
use bazaar_domain::product::ProductSortBy;

use crate::domain::types::{Product, ProductDetail, ProductFilter, ProductImage};
use crate::error::ShopServiceError;
use crate::handlers::extract::{Json, Path, parse_query};
use crate::state::AppState;
use crate::usecase::product::{
    AddImageInput, AddImageUseCase, CreateProductInput, CreateProductUseCase,
    DeleteProductUseCase, GetProductUseCase, ListProductsUseCase, RemoveImageUseCase,
    UpdateProductInput, UpdateProductUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub sku: Option<String>,
    pub category_id: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageResponse>>,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            sku: product.sku,
            category_id: product.category_id.to_string(),
            is_active: product.is_active,
            images: None,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl From<ProductDetail> for ProductResponse {
    fn from(detail: ProductDetail) -> Self {
        let images = detail.images.into_iter().map(ImageResponse::from).collect();
        Self {
            images: Some(images),
            ..detail.product.into()
        }
    }
}

#[derive(Serialize)]
pub struct ImageResponse {
    pub id: String,
    pub product_id: String,
    pub url: String,
    pub alt_text: String,
    pub is_primary: bool,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProductImage> for ImageResponse {
    fn from(image: ProductImage) -> Self {
        Self {
            id: image.id.to_string(),
            product_id: image.product_id.to_string(),
            url: image.url,
            alt_text: image.alt_text,
            is_primary: image.is_primary,
            created_at: image.created_at,
        }
    }
}

// ── GET /products ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ProductListQuery {
    pub category_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: ProductSortBy,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}


pub async fn list_products(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<ApiResponse<Page<ProductResponse>>, ShopServiceError> {
    let query: ProductListQuery = parse_query(raw_query)?;
    let page = PageRequest::from_query(query.per_page, query.page);
    let usecase = ListProductsUseCase {
        repo: state.product_repo(),
    };
    let products = usecase
        .execute(
            ProductFilter {
                category_id: query.category_id,
                min_price: query.min_price,
                max_price: query.max_price,
                search: query.search,
                sort_by: query.sort_by,
            },
            page,
        )
        .await?;
    Ok(ApiResponse::ok(
        products.map(ProductResponse::from),
        "products retrieved successfully",
    ))
}

// ── GET /products/{id} ───────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ProductResponse>, ShopServiceError> {
    let usecase = GetProductUseCase {
        repo: state.product_repo(),
    };
    let detail = usecase.execute(id).await?;
    Ok(ApiResponse::ok(detail.into(), "product retrieved successfully"))
}

// ── POST /admin/products ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub sku: Option<String>,
    pub category_id: Uuid,
    pub is_active: Option<bool>,
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<ApiResponse<ProductResponse>, ShopServiceError> {
    let usecase = CreateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
    };
    let product = usecase
        .execute(CreateProductInput {
            name: body.name,
            description: body.description,
            price: body.price,
            stock: body.stock,
            sku: body.sku,
            category_id: body.category_id,
            is_active: body.is_active,
        })
        .await?;
    Ok(ApiResponse::created(
        product.into(),
        "product created successfully",
    ))
}

// ── PUT /admin/products/{id} ─────────────────────────────────────────────────

/// Present fields are applied, absent ones left as they are.
#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<ApiResponse<ProductResponse>, ShopServiceError> {
    let usecase = UpdateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
    };
    let product = usecase
        .execute(
            id,
            UpdateProductInput {
                name: body.name,
                description: body.description,
                price: body.price,
                stock: body.stock,
                sku: body.sku,
                category_id: body.category_id,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(ApiResponse::ok(product.into(), "product updated successfully"))
}

// ── DELETE /admin/products/{id} ──────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ShopServiceError> {
    let usecase = DeleteProductUseCase {
        repo: state.product_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /admin/products/{id}/images ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddImageRequest {
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

pub async fn add_image(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<AddImageRequest>,
) -> Result<ApiResponse<ImageResponse>, ShopServiceError> {
    let usecase = AddImageUseCase {
        repo: state.product_repo(),
    };
    let image = usecase
        .execute(
            product_id,
            AddImageInput {
                url: body.url,
                alt_text: body.alt_text,
                is_primary: body.is_primary,
            },
        )
        .await?;
    Ok(ApiResponse::created(image.into(), "image added successfully"))
}

// ── DELETE /admin/products/{id}/images/{image_id} ────────────────────────────

pub async fn remove_image(
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ShopServiceError> {
    let usecase = RemoveImageUseCase {
        repo: state.product_repo(),
    };
    usecase.execute(product_id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
