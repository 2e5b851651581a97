use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::{Category, non_blank};
use crate::error::ShopServiceError;

pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

fn category_name(name: &str) -> Result<String, ShopServiceError> {
    non_blank(name)
        .map(str::to_owned)
        .ok_or_else(|| ShopServiceError::validation("category name is required"))
}

// ── CreateCategory ───────────────────────────────────────────────────────────

pub struct CreateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> CreateCategoryUseCase<R> {
    pub async fn execute(&self, input: CategoryInput) -> Result<Category, ShopServiceError> {
        let name = category_name(&input.name)?;
        if self.repo.find_by_name(&name).await?.is_some() {
            return Err(ShopServiceError::CategoryAlreadyExists);
        }
        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            name,
            description: input.description.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&category).await?;
        Ok(category)
    }
}

// ── GetCategory / ListCategories ─────────────────────────────────────────────

pub struct GetCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> GetCategoryUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Category, ShopServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ShopServiceError::CategoryNotFound)
    }
}

pub struct ListCategoriesUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> ListCategoriesUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Category>, ShopServiceError> {
        self.repo.list().await
    }
}

// ── UpdateCategory ───────────────────────────────────────────────────────────

pub struct UpdateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> UpdateCategoryUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<Category, ShopServiceError> {
        let mut category = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ShopServiceError::CategoryNotFound)?;
        let name = category_name(&input.name)?;
        if name != category.name {
            if let Some(other) = self.repo.find_by_name(&name).await? {
                if other.id != id {
                    return Err(ShopServiceError::CategoryAlreadyExists);
                }
            }
        }
        category.name = name;
        if let Some(description) = input.description {
            category.description = description;
        }
        category.updated_at = Utc::now();
        self.repo.update(&category).await?;
        Ok(category)
    }
}

// ── DeleteCategory ───────────────────────────────────────────────────────────

pub struct DeleteCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> DeleteCategoryUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ShopServiceError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ShopServiceError::CategoryNotFound);
        }
        if self.repo.has_products(id).await? {
            return Err(ShopServiceError::CategoryHasProducts);
        }
        if !self.repo.soft_delete(id).await? {
            return Err(ShopServiceError::CategoryNotFound);
        }
        Ok(())
    }
}
