use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use bazaar_domain::pagination::{PageRequest, Sort};
use bazaar_domain::product::ProductSortBy;
use bazaar_shop::domain::types::{Product, ProductFilter};
use bazaar_shop::error::ShopServiceError;
use bazaar_shop::usecase::product::{
    AddImageInput, AddImageUseCase, CreateProductInput, CreateProductUseCase, GetProductUseCase,
    ListProductsUseCase, RemoveImageUseCase, UpdateProductInput, UpdateProductUseCase,
};

use crate::helpers::InMemoryShop;

fn price(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn lamp(category_id: Uuid) -> CreateProductInput {
    CreateProductInput {
        name: "Desk Lamp".to_owned(),
        description: Some("Warm LED light".to_owned()),
        price: price("24.90"),
        stock: 7,
        sku: None,
        category_id,
        is_active: None,
    }
}

fn update(shop: &InMemoryShop) -> UpdateProductUseCase<InMemoryShop, InMemoryShop> {
    UpdateProductUseCase {
        products: shop.clone(),
        categories: shop.clone(),
    }
}

fn stored(shop: &InMemoryShop, id: Uuid) -> Product {
    shop.lock()
        .products
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .unwrap()
}

async fn list(shop: &InMemoryShop, filter: ProductFilter) -> Vec<String> {
    ListProductsUseCase { repo: shop.clone() }
        .execute(filter, PageRequest::default())
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.name)
        .collect()
}

fn image(url: &str, is_primary: bool) -> AddImageInput {
    AddImageInput {
        url: url.to_owned(),
        alt_text: None,
        is_primary,
    }
}

// ── Create / Update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_product_in_existing_category() {
    let shop = InMemoryShop::new();
    let category = shop.seed_category("Lighting");

    let product = CreateProductUseCase {
        products: shop.clone(),
        categories: shop.clone(),
    }
    .execute(lamp(category.id))
    .await
    .unwrap();

    assert!(product.is_active);
    assert_eq!(stored(&shop, product.id).price, price("24.90"));
}

#[tokio::test]
async fn should_reject_product_in_unknown_category() {
    let shop = InMemoryShop::new();

    let result = CreateProductUseCase {
        products: shop.clone(),
        categories: shop.clone(),
    }
    .execute(lamp(Uuid::now_v7()))
    .await;

    assert!(matches!(result, Err(ShopServiceError::CategoryNotFound)));
    assert!(shop.lock().products.is_empty());
}

#[tokio::test]
async fn should_leave_absent_fields_unchanged_and_apply_zero_stock() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Mug", "8.00", 12);

    let updated = update(&shop)
        .execute(
            product.id,
            UpdateProductInput {
                stock: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.stock, 0);
    assert_eq!(updated.name, "Mug");
    assert_eq!(updated.price, price("8.00"));
    assert_eq!(stored(&shop, product.id).stock, 0);
}

#[tokio::test]
async fn should_refuse_updates_breaking_price_or_stock_rules() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Mug", "8.00", 12);

    let negative_stock = update(&shop)
        .execute(
            product.id,
            UpdateProductInput {
                stock: Some(-1),
                ..Default::default()
            },
        )
        .await;
    let free = update(&shop)
        .execute(
            product.id,
            UpdateProductInput {
                price: Some(Decimal::ZERO),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(negative_stock, Err(ShopServiceError::Validation(_))));
    assert!(matches!(free, Err(ShopServiceError::Validation(_))));
    let after = stored(&shop, product.id);
    assert_eq!(after.stock, 12);
    assert_eq!(after.price, price("8.00"));
}

#[tokio::test]
async fn should_reject_move_to_unknown_category() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Mug", "8.00", 12);

    let result = update(&shop)
        .execute(
            product.id,
            UpdateProductInput {
                category_id: Some(Uuid::now_v7()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ShopServiceError::CategoryNotFound)));
    assert_eq!(stored(&shop, product.id).category_id, product.category_id);
}

// ── ListProducts ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_everything_without_filters() {
    let shop = InMemoryShop::new();
    shop.seed_product("Mug", "8.00", 1);
    shop.seed_product("Kettle", "40.00", 1);

    assert_eq!(list(&shop, ProductFilter::default()).await.len(), 2);
}

#[tokio::test]
async fn should_compose_category_price_and_search_filters() {
    let shop = InMemoryShop::new();
    let mug = shop.seed_product("Blue Mug", "8.00", 1);
    let category_id = mug.category_id;
    let in_category = |name: &str, amount: &str, description: &str| {
        let mut product = shop.seed_product(name, amount, 1);
        product.category_id = category_id;
        product.description = description.to_owned();
        let mut store = shop.lock();
        if let Some(slot) = store.products.iter_mut().find(|p| p.id == product.id) {
            *slot = product;
        }
    };
    in_category("Tall Mug", "15.00", "");
    in_category("Teapot", "12.00", "pairs with any MUG");
    in_category("Plate", "9.00", "");
    shop.seed_product("Travel Mug", "10.00", 1);

    let names = list(
        &shop,
        ProductFilter {
            category_id: Some(category_id),
            min_price: Some(price("8.00")),
            max_price: Some(price("12.00")),
            search: Some("mug".to_owned()),
            sort_by: ProductSortBy::Price(Sort::Asc),
        },
    )
    .await;

    assert_eq!(names, vec!["Blue Mug", "Teapot"]);
}

#[tokio::test]
async fn should_treat_blank_search_as_no_constraint() {
    let shop = InMemoryShop::new();
    shop.seed_product("Mug", "8.00", 1);

    let names = list(
        &shop,
        ProductFilter {
            search: Some("   ".to_owned()),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(names, vec!["Mug"]);
}

#[tokio::test]
async fn should_reject_negative_min_price() {
    let shop = InMemoryShop::new();

    let result = ListProductsUseCase { repo: shop.clone() }
        .execute(
            ProductFilter {
                min_price: Some(price("-5")),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await;

    assert!(matches!(result, Err(ShopServiceError::Validation(_))));
}

// ── Images ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_make_first_image_primary() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Mug", "8.00", 1);
    let add = AddImageUseCase { repo: shop.clone() };

    let first = add
        .execute(product.id, image("https://cdn/1.jpg", false))
        .await
        .unwrap();
    let second = add
        .execute(product.id, image("https://cdn/2.jpg", false))
        .await
        .unwrap();

    assert!(first.is_primary);
    assert!(!second.is_primary);
}

#[tokio::test]
async fn should_keep_a_single_primary_image() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Mug", "8.00", 1);
    let add = AddImageUseCase { repo: shop.clone() };
    add.execute(product.id, image("https://cdn/1.jpg", false))
        .await
        .unwrap();
    let cover = add
        .execute(product.id, image("https://cdn/2.jpg", true))
        .await
        .unwrap();

    let detail = GetProductUseCase { repo: shop.clone() }
        .execute(product.id)
        .await
        .unwrap();
    let primaries: Vec<Uuid> = detail
        .images
        .iter()
        .filter(|i| i.is_primary)
        .map(|i| i.id)
        .collect();
    assert_eq!(primaries, vec![cover.id]);
}

#[tokio::test]
async fn should_promote_remaining_image_when_primary_removed() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Mug", "8.00", 1);
    let add = AddImageUseCase { repo: shop.clone() };
    let first = add
        .execute(product.id, image("https://cdn/1.jpg", false))
        .await
        .unwrap();
    let second = add
        .execute(product.id, image("https://cdn/2.jpg", false))
        .await
        .unwrap();

    RemoveImageUseCase { repo: shop.clone() }
        .execute(product.id, first.id)
        .await
        .unwrap();

    let detail = GetProductUseCase { repo: shop.clone() }
        .execute(product.id)
        .await
        .unwrap();
    assert_eq!(detail.images.len(), 1);
    assert_eq!(detail.images[0].id, second.id);
    assert!(detail.images[0].is_primary);
}

#[tokio::test]
async fn should_require_image_url() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Mug", "8.00", 1);

    let result = AddImageUseCase { repo: shop.clone() }
        .execute(product.id, image("  ", false))
        .await;

    assert!(matches!(result, Err(ShopServiceError::Validation(_))));
}
