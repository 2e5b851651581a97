//! Bearer credentials for tests.
//!
//! `MockAuth` signs a real access token with the secret the service under test
//! was built with, so requests pass the same middleware production traffic does.

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use bazaar_auth_types::token::issue_access_token;
use bazaar_domain::user::UserRole;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "bazaar-test-secret";

/// Identity a test request claims to be.
pub struct MockAuth {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub secret: String,
}

impl MockAuth {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            email: format!("{user_id}@test.local"),
            role,
            secret: TEST_JWT_SECRET.to_owned(),
        }
    }

    pub fn user() -> Self {
        Self::new(Uuid::now_v7(), UserRole::User)
    }

    pub fn admin() -> Self {
        Self::new(Uuid::now_v7(), UserRole::Admin)
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = secret.to_owned();
        self
    }

    pub fn token(&self) -> String {
        issue_access_token(self.user_id, &self.email, self.role, &self.secret, 3600)
            .expect("test token must encode")
    }

    pub fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token()))
            .expect("bearer header must be ascii")
    }

    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, self.header_value());
        map
    }
}
