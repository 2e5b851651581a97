use rust_decimal::Decimal;

use bazaar_auth_types::token::validate_access_token;
use bazaar_shop::usecase::auth::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};
use bazaar_shop::usecase::cart::{AddToCartInput, AddToCartUseCase, GetCartUseCase};
use bazaar_shop::usecase::order::{CreateOrderInput, CreateOrderUseCase};
use bazaar_testing::auth::TEST_JWT_SECRET;

use crate::helpers::InMemoryShop;

#[tokio::test]
async fn should_checkout_merged_cart_line_end_to_end() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Mug", "12.50", 5);

    let user = RegisterUseCase { repo: shop.clone() }
        .execute(RegisterInput {
            email: "a@x.com".to_owned(),
            password: "secret1".to_owned(),
            name: "Alice".to_owned(),
        })
        .await
        .unwrap();

    let login = LoginUseCase {
        repo: shop.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        jwt_expiration_secs: 86_400,
    }
    .execute(LoginInput {
        email: "a@x.com".to_owned(),
        password: "secret1".to_owned(),
    })
    .await
    .unwrap();
    let claims = validate_access_token(&login.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.user_id, user.id);

    let add = AddToCartUseCase {
        carts: shop.clone(),
        products: shop.clone(),
    };
    let cart = add
        .execute(
            user.id,
            AddToCartInput {
                product_id: product.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(cart.total(), product.price * Decimal::from(2));

    let cart = add
        .execute(
            user.id,
            AddToCartInput {
                product_id: product.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 4);
    assert_eq!(cart.items[0].subtotal(), product.price * Decimal::from(4));

    let order = CreateOrderUseCase {
        orders: shop.clone(),
        carts: shop.clone(),
        addresses: shop.clone(),
    }
    .execute(user.id, CreateOrderInput::default())
    .await
    .unwrap();
    assert_eq!(order.total_amount, product.price * Decimal::from(4));
    assert_eq!(order.total_amount, Decimal::new(5000, 2));

    let cart = GetCartUseCase { repo: shop.clone() }
        .execute(user.id)
        .await
        .unwrap();
    assert!(cart.is_empty());
    assert_eq!(shop.stock_of(product.id), 1);
}

#[tokio::test]
async fn should_reject_second_registration_with_same_email() {
    let shop = InMemoryShop::new();
    let register = RegisterUseCase { repo: shop.clone() };
    let input = || RegisterInput {
        email: "a@x.com".to_owned(),
        password: "secret1".to_owned(),
        name: "Alice".to_owned(),
    };

    register.execute(input()).await.unwrap();
    let second = register.execute(input()).await;

    assert!(
        matches!(second, Err(bazaar_shop::error::ShopServiceError::EmailAlreadyRegistered)),
        "expected EmailAlreadyRegistered, got {second:?}"
    );
    assert_eq!(shop.lock().users.len(), 1);
}
