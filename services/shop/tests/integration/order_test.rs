use uuid::Uuid;

use bazaar_domain::order::OrderStatus;
use bazaar_shop::domain::types::Product;
use bazaar_shop::error::ShopServiceError;
use bazaar_shop::usecase::cart::{AddToCartInput, AddToCartUseCase, UpdateCartItemUseCase};
use bazaar_shop::usecase::order::{
    CancelOrderUseCase, CreateOrderInput, CreateOrderUseCase, GetOrderUseCase,
    UpdateOrderStatusInput, UpdateOrderStatusUseCase,
};

use crate::helpers::InMemoryShop;

async fn add_to_cart(shop: &InMemoryShop, user_id: Uuid, product: &Product, quantity: i32) {
    AddToCartUseCase {
        carts: shop.clone(),
        products: shop.clone(),
    }
    .execute(
        user_id,
        AddToCartInput {
            product_id: product.id,
            quantity,
        },
    )
    .await
    .unwrap();
}

fn create_order(shop: &InMemoryShop) -> CreateOrderUseCase<InMemoryShop, InMemoryShop, InMemoryShop> {
    CreateOrderUseCase {
        orders: shop.clone(),
        carts: shop.clone(),
        addresses: shop.clone(),
    }
}

fn update_status(shop: &InMemoryShop) -> UpdateOrderStatusUseCase<InMemoryShop> {
    UpdateOrderStatusUseCase { repo: shop.clone() }
}

fn to(status: OrderStatus) -> UpdateOrderStatusInput {
    UpdateOrderStatusInput {
        status,
        tracking_number: None,
    }
}

// ── CreateOrder ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_fail_on_empty_cart_without_side_effects() {
    let shop = InMemoryShop::new();
    let product = shop.seed_product("Lamp", "30.00", 3);

    let result = create_order(&shop)
        .execute(Uuid::now_v7(), CreateOrderInput::default())
        .await;

    assert!(matches!(result, Err(ShopServiceError::CartEmpty)));
    assert_eq!(shop.order_count(), 0);
    assert_eq!(shop.cart_count(), 0);
    assert_eq!(shop.stock_of(product.id), 3);
}

#[tokio::test]
async fn should_total_order_as_sum_of_line_subtotals() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let pen = shop.seed_product("Pen", "1.25", 10);
    let pad = shop.seed_product("Pad", "3.40", 10);
    add_to_cart(&shop, user_id, &pen, 4).await;
    add_to_cart(&shop, user_id, &pad, 2).await;

    let order = create_order(&shop)
        .execute(user_id, CreateOrderInput::default())
        .await
        .unwrap();

    let summed: rust_decimal::Decimal = order.items.iter().map(|i| i.subtotal()).sum();
    assert_eq!(order.total_amount, summed);
    assert_eq!(order.total_amount.to_string(), "11.80");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(shop.stock_of(pen.id), 6);
    assert_eq!(shop.stock_of(pad.id), 8);
}

#[tokio::test]
async fn should_abort_whole_order_when_stock_ran_out_after_carting() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let plenty = shop.seed_product("Plenty", "2.00", 10);
    let scarce = shop.seed_product("Scarce", "9.00", 2);
    add_to_cart(&shop, user_id, &plenty, 1).await;
    add_to_cart(&shop, user_id, &scarce, 2).await;

    // Someone else bought the scarce product in the meantime.
    let rival = Uuid::now_v7();
    add_to_cart(&shop, rival, &scarce, 1).await;
    create_order(&shop)
        .execute(rival, CreateOrderInput::default())
        .await
        .unwrap();

    let result = create_order(&shop)
        .execute(user_id, CreateOrderInput::default())
        .await;

    assert!(matches!(result, Err(ShopServiceError::InsufficientStock)));
    assert_eq!(shop.order_count(), 1);
    assert_eq!(shop.stock_of(plenty.id), 10);
    assert_eq!(shop.stock_of(scarce.id), 1);
}

#[tokio::test]
async fn should_reject_cart_quantity_beyond_stock() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let product = shop.seed_product("Kettle", "45.00", 2);
    add_to_cart(&shop, user_id, &product, 2).await;

    let result = AddToCartUseCase {
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
    .await;

    assert!(matches!(result, Err(ShopServiceError::InsufficientStock)));
}

#[tokio::test]
async fn should_reject_non_positive_cart_update() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let product = shop.seed_product("Bowl", "8.00", 5);
    add_to_cart(&shop, user_id, &product, 1).await;
    let item_id = shop.lock().cart_items[0].id;

    let result = UpdateCartItemUseCase {
        carts: shop.clone(),
        products: shop.clone(),
    }
    .execute(user_id, item_id, 0)
    .await;

    assert!(matches!(result, Err(ShopServiceError::Validation(_))));
    assert_eq!(shop.lock().cart_items[0].quantity, 1);
}

// ── CancelOrder ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_cancel_pending_order_and_restore_stock() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let product = shop.seed_product("Chair", "60.00", 4);
    add_to_cart(&shop, user_id, &product, 3).await;
    let order = create_order(&shop)
        .execute(user_id, CreateOrderInput::default())
        .await
        .unwrap();
    assert_eq!(shop.stock_of(product.id), 1);

    let cancelled = CancelOrderUseCase { repo: shop.clone() }
        .execute(order.id, user_id)
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(shop.stock_of(product.id), 4);
}

#[tokio::test]
async fn should_refuse_cancel_outside_pending_and_keep_status() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let product = shop.seed_product("Desk", "120.00", 2);

    for status in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        add_to_cart(&shop, user_id, &product, 1).await;
        let order = create_order(&shop)
            .execute(user_id, CreateOrderInput::default())
            .await
            .unwrap();
        shop.force_status(order.id, status);
        let stock_before = shop.stock_of(product.id);

        let result = CancelOrderUseCase { repo: shop.clone() }
            .execute(order.id, user_id)
            .await;

        assert!(
            matches!(result, Err(ShopServiceError::OrderNotCancellable)),
            "cancel from {status} should fail, got {result:?}"
        );
        assert_eq!(shop.status_of(order.id), status);
        assert_eq!(shop.stock_of(product.id), stock_before);

        // Put the unit back so the next iteration can cart it again.
        shop.lock()
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .unwrap()
            .stock += 1;
    }
}

#[tokio::test]
async fn should_forbid_access_to_another_users_order() {
    let shop = InMemoryShop::new();
    let owner = Uuid::now_v7();
    let product = shop.seed_product("Rug", "80.00", 1);
    add_to_cart(&shop, owner, &product, 1).await;
    let order = create_order(&shop)
        .execute(owner, CreateOrderInput::default())
        .await
        .unwrap();

    let stranger = Uuid::now_v7();
    let get = GetOrderUseCase { repo: shop.clone() }
        .execute(order.id, stranger)
        .await;
    let cancel = CancelOrderUseCase { repo: shop.clone() }
        .execute(order.id, stranger)
        .await;

    assert!(matches!(get, Err(ShopServiceError::NotOwner)));
    assert!(matches!(cancel, Err(ShopServiceError::NotOwner)));
    assert_eq!(shop.status_of(order.id), OrderStatus::Pending);
}

// ── UpdateOrderStatus ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_walk_order_through_fulfilment() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let product = shop.seed_product("Vase", "15.00", 1);
    add_to_cart(&shop, user_id, &product, 1).await;
    let order = create_order(&shop)
        .execute(user_id, CreateOrderInput::default())
        .await
        .unwrap();

    update_status(&shop)
        .execute(order.id, to(OrderStatus::Processing))
        .await
        .unwrap();
    let shipped = update_status(&shop)
        .execute(
            order.id,
            UpdateOrderStatusInput {
                status: OrderStatus::Shipped,
                tracking_number: Some("TRK-123".to_owned()),
            },
        )
        .await
        .unwrap();
    assert_eq!(shipped.tracking_number.as_deref(), Some("TRK-123"));

    let delivered = update_status(&shop)
        .execute(order.id, to(OrderStatus::Delivered))
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn should_reject_transition_outside_allow_list() {
    let shop = InMemoryShop::new();
    let user_id = Uuid::now_v7();
    let product = shop.seed_product("Clock", "25.00", 1);
    add_to_cart(&shop, user_id, &product, 1).await;
    let order = create_order(&shop)
        .execute(user_id, CreateOrderInput::default())
        .await
        .unwrap();

    let result = update_status(&shop)
        .execute(order.id, to(OrderStatus::Delivered))
        .await;

    match result {
        Err(err @ ShopServiceError::InvalidStatusTransition { .. }) => {
            assert_eq!(
                err.to_string(),
                "cannot change order status from pending to delivered"
            );
        }
        other => panic!("expected InvalidStatusTransition, got {other:?}"),
    }
    assert_eq!(shop.status_of(order.id), OrderStatus::Pending);
}
