/// Shop service configuration loaded from environment variables.
///
/// A `.env` file in the working directory is honoured when present.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC key for access tokens. Env var: `JWT_SECRET`. Required.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default 86400). Env var: `JWT_EXPIRATION_SECS`.
    pub jwt_expiration_secs: i64,
    /// TCP port for the HTTP server (default 8080). Env var: `SHOP_PORT`.
    pub shop_port: u16,
}

impl ShopConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            jwt_expiration_secs: std::env::var("JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86_400),
            shop_port: std::env::var("SHOP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }
}
