use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use uuid::Uuid;

use bazaar_auth_types::token::issue_access_token;
use bazaar_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, non_blank};
use crate::error::ShopServiceError;

pub const MIN_PASSWORD_LEN: usize = 6;

// ── Password hashing ─────────────────────────────────────────────────────────

/// Argon2id with a random salt, encoded as a PHC string.
pub fn hash_password(password: &str) -> Result<String, ShopServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("hash password: {e}").into())
}

/// `false` for a mismatch and for an unparseable stored hash alike.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub(crate) fn validate_email(email: &str) -> Result<String, ShopServiceError> {
    let email = non_blank(email).ok_or_else(|| ShopServiceError::validation("email is required"))?;
    if !email.contains('@') {
        return Err(ShopServiceError::validation("email is invalid"));
    }
    Ok(email.to_lowercase())
}

pub(crate) fn validate_password(password: &str) -> Result<(), ShopServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ShopServiceError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub struct RegisterUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> RegisterUseCase<R> {
    pub async fn execute(&self, input: RegisterInput) -> Result<User, ShopServiceError> {
        let email = validate_email(&input.email)?;
        validate_password(&input.password)?;
        let name = non_blank(&input.name)
            .ok_or_else(|| ShopServiceError::validation("name is required"))?
            .to_owned();

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(ShopServiceError::EmailAlreadyRegistered);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email,
            password_hash: hash_password(&input.password)?,
            name,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginOutput {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

pub struct LoginUseCase<R: UserRepository> {
    pub repo: R,
    pub jwt_secret: String,
    pub jwt_expiration_secs: i64,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ShopServiceError> {
        let email = input.email.trim().to_lowercase();
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(ShopServiceError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash) {
            return Err(ShopServiceError::InvalidCredentials);
        }

        let token = issue_access_token(
            user.id,
            &user.email,
            user.role,
            &self.jwt_secret,
            self.jwt_expiration_secs,
        )
        .map_err(|e| anyhow::anyhow!("issue access token: {e}"))?;

        Ok(LoginOutput {
            token,
            expires_in: self.jwt_expiration_secs,
            user,
        })
    }
}
