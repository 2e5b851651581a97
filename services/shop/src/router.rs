use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bazaar_core::health::healthz;
use bazaar_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    address::{
        create_address, delete_address, get_address, list_addresses, set_default_address,
        update_address,
    },
    auth::{login, register},
    cart::{add_item, clear_cart, get_cart, remove_item, update_item},
    category::{create_category, delete_category, get_category, list_categories, update_category},
    health::readyz,
    middleware::{require_admin, require_auth},
    order::{cancel_order, create_order, get_order, list_all_orders, list_orders, update_order_status},
    product::{
        add_image, create_product, delete_product, get_product, list_products, remove_image,
        update_product,
    },
    review::{create_review, delete_review, list_my_reviews, list_product_reviews, update_review},
    user::{delete_me, get_me, update_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        // Catalog
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/reviews", get(list_product_reviews))
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category));

    let authenticated = Router::new()
        // Users
        .route("/users/me", get(get_me).put(update_me).delete(delete_me))
        .route("/users/me/reviews", get(list_my_reviews))
        // Cart
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/{id}", put(update_item).delete(remove_item))
        // Orders
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/cancel", post(cancel_order))
        // Reviews
        .route("/products/{id}/reviews", post(create_review))
        .route("/reviews/{id}", put(update_review).delete(delete_review))
        // Addresses
        .route("/addresses", get(list_addresses).post(create_address))
        .route(
            "/addresses/{id}",
            get(get_address).put(update_address).delete(delete_address),
        )
        .route("/addresses/{id}/default", put(set_default_address))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/admin/products", post(create_product))
        .route(
            "/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/admin/products/{id}/images", post(add_image))
        .route("/admin/products/{id}/images/{image_id}", delete(remove_image))
        .route("/admin/categories", post(create_category))
        .route(
            "/admin/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/admin/orders", get(list_all_orders))
        .route("/admin/orders/{id}/status", put(update_order_status))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1", public.merge(authenticated).merge(admin))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
