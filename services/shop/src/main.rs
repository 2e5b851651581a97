use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use bazaar_core::tracing::init_tracing;
use bazaar_shop::config::ShopConfig;
use bazaar_shop::router::build_router;
use bazaar_shop::state::{AppState, JwtSettings};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ShopConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        jwt: JwtSettings {
            secret: Arc::from(config.jwt_secret.as_str()),
            expiration_secs: config.jwt_expiration_secs,
        },
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.shop_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("shop service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
