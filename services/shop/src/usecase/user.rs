use bazaar_domain::user::UserRole;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, non_blank};
use crate::error::ShopServiceError;
use crate::usecase::auth::{hash_password, validate_email, validate_password};

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, ShopServiceError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(ShopServiceError::UserNotFound)
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

/// Self-service profile patch. Absent fields are left unchanged. The role is
/// not part of the patch and is always reset to `user`.
#[derive(Default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct UpdateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdateUserUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdateUserInput,
    ) -> Result<User, ShopServiceError> {
        let mut user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(ShopServiceError::UserNotFound)?;

        if let Some(name) = input.name.as_deref() {
            user.name = non_blank(name)
                .ok_or_else(|| ShopServiceError::validation("name cannot be empty"))?
                .to_owned();
        }
        if let Some(email) = input.email.as_deref() {
            let email = validate_email(email)?;
            if email != user.email {
                if let Some(holder) = self.repo.find_by_email(&email).await? {
                    if holder.id != user.id {
                        return Err(ShopServiceError::EmailAlreadyRegistered);
                    }
                }
                user.email = email;
            }
        }
        if let Some(password) = input.password.as_deref() {
            validate_password(password)?;
            user.password_hash = hash_password(password)?;
        }

        user.role = UserRole::User;
        user.updated_at = Utc::now();
        self.repo.update(&user).await?;
        Ok(user)
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> DeleteUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), ShopServiceError> {
        if !self.repo.soft_delete(user_id).await? {
            return Err(ShopServiceError::UserNotFound);
        }
        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }
}
