use chrono::Utc;
use uuid::Uuid;

use bazaar_domain::address::AddressType;
use bazaar_shop::domain::repository::AddressRepository;
use bazaar_shop::domain::types::Address;
use bazaar_shop::error::ShopServiceError;
use bazaar_shop::usecase::address::{
    AddressInput, CreateAddressUseCase, DeleteAddressUseCase, ListAddressesUseCase,
};
use bazaar_shop::usecase::cart::{AddToCartInput, AddToCartUseCase};
use bazaar_shop::usecase::order::{CreateOrderInput, CreateOrderUseCase};

use crate::helpers::InMemoryShop;

fn input(city: &str) -> AddressInput {
    AddressInput {
        address_type: "shipping".to_owned(),
        street: "1 Main St".to_owned(),
        city: city.to_owned(),
        state: "OR".to_owned(),
        country: "US".to_owned(),
        zip_code: "97201".to_owned(),
    }
}

async fn create(shop: &InMemoryShop, user_id: Uuid, city: &str) -> Address {
    CreateAddressUseCase { repo: shop.clone() }
        .execute(user_id, input(city))
        .await
        .unwrap()
}

async fn list(shop: &InMemoryShop, user_id: Uuid) -> Vec<Address> {
    ListAddressesUseCase { repo: shop.clone() }
        .execute(user_id)
        .await
        .unwrap()
}

#[tokio::test]
async fn deleting_only_address_leaves_no_default() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let only = create(&shop, user_id, "Portland").await;
    assert!(only.is_default);

    DeleteAddressUseCase { repo: shop.clone() }
        .execute(user_id, only.id)
        .await
        .unwrap();

    assert!(list(&shop, user_id).await.is_empty());
}

#[tokio::test]
async fn should_promote_remaining_address_when_default_deleted() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let first = create(&shop, user_id, "Portland").await;
    let second = create(&shop, user_id, "Salem").await;
    assert!(!second.is_default);

    DeleteAddressUseCase { repo: shop.clone() }
        .execute(user_id, first.id)
        .await
        .unwrap();

    let remaining = list(&shop, user_id).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id);
    assert!(remaining[0].is_default);
}

#[tokio::test]
async fn should_ship_order_to_default_address() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let home = create(&shop, user_id, "Portland").await;
    let product = shop.seed_product("Plant", "14.00", 2);
    AddToCartUseCase {
        carts: shop.clone(),
        products: shop.clone(),
    }
    .execute(
        user_id,
        AddToCartInput {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();

    let order = CreateOrderUseCase {
        orders: shop.clone(),
        carts: shop.clone(),
        addresses: shop.clone(),
    }
    .execute(user_id, CreateOrderInput::default())
    .await
    .unwrap();

    assert_eq!(order.shipping_address_id, Some(home.id));
}

#[tokio::test]
async fn should_not_ship_to_another_users_address() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let foreign = create(&shop, Uuid::now_v7(), "Eugene").await;
    let product = shop.seed_product("Pot", "9.00", 2);
    AddToCartUseCase {
        carts: shop.clone(),
        products: shop.clone(),
    }
    .execute(
        user_id,
        AddToCartInput {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();

    let result = CreateOrderUseCase {
        orders: shop.clone(),
        carts: shop.clone(),
        addresses: shop.clone(),
    }
    .execute(
        user_id,
        CreateOrderInput {
            shipping_address_id: Some(foreign.id),
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(result, Err(ShopServiceError::AddressNotFound)));
    assert_eq!(shop.order_count(), 0);
    assert_eq!(shop.stock_of(product.id), 2);
}

#[tokio::test]
async fn should_keep_one_default_when_first_addresses_race() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    // Both requests saw an empty address book and ask to be the default.
    let racing = |city: &str| Address {
        id: Uuid::now_v7(),
        user_id,
        address_type: AddressType::Shipping,
        street: "1 Main St".to_owned(),
        city: city.to_owned(),
        state: "OR".to_owned(),
        country: "US".to_owned(),
        zip_code: "97201".to_owned(),
        is_default: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let first = shop.create(&racing("Portland")).await.unwrap();
    let second = shop.create(&racing("Salem")).await.unwrap();

    assert!(first.is_default);
    assert!(!second.is_default);
    let defaults = list(&shop, user_id)
        .await
        .into_iter()
        .filter(|a| a.is_default)
        .count();
    assert_eq!(defaults, 1);
}
