use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAddressRepository, DbCartRepository, DbCategoryRepository, DbOrderRepository,
    DbProductRepository, DbReviewRepository, DbUserRepository,
};

/// Token settings shared by issuing (login) and verifying (middleware) paths.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: Arc<str>,
    pub expiration_secs: i64,
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt: JwtSettings,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn cart_repo(&self) -> DbCartRepository {
        DbCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn review_repo(&self) -> DbReviewRepository {
        DbReviewRepository {
            db: self.db.clone(),
        }
    }

    pub fn address_repo(&self) -> DbAddressRepository {
        DbAddressRepository {
            db: self.db.clone(),
        }
    }
}
