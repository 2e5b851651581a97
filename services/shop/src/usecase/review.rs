use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{OrderRepository, ProductRepository, ReviewRepository};
use crate::domain::types::Review;
use crate::error::ShopServiceError;

fn valid_rating(rating: i16) -> Result<i16, ShopServiceError> {
    if !(1..=5).contains(&rating) {
        return Err(ShopServiceError::validation("rating must be between 1 and 5"));
    }
    Ok(rating)
}

async fn owned_review<R: ReviewRepository>(
    reviews: &R,
    id: Uuid,
    user_id: Uuid,
) -> Result<Review, ShopServiceError> {
    let review = reviews
        .find_by_id(id)
        .await?
        .ok_or(ShopServiceError::ReviewNotFound)?;
    if review.user_id != user_id {
        return Err(ShopServiceError::NotOwner);
    }
    Ok(review)
}

// ── CreateReview ─────────────────────────────────────────────────────────────

pub struct CreateReviewInput {
    pub rating: i16,
    pub title: Option<String>,
    pub comment: Option<String>,
}

pub struct CreateReviewUseCase<R: ReviewRepository, O: OrderRepository, P: ProductRepository> {
    pub reviews: R,
    pub orders: O,
    pub products: P,
}

impl<R: ReviewRepository, O: OrderRepository, P: ProductRepository> CreateReviewUseCase<R, O, P> {
    /// Only buyers with a delivered order containing the product may review,
    /// once per product. `delivered` is terminal, so eligibility cannot be
    /// lost between the check and the insert.
    pub async fn execute(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: CreateReviewInput,
    ) -> Result<Review, ShopServiceError> {
        let rating = valid_rating(input.rating)?;
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(ShopServiceError::ProductNotFound);
        }
        if !self
            .orders
            .has_delivered_purchase(user_id, product_id)
            .await?
        {
            return Err(ShopServiceError::PurchaseRequired);
        }
        if self
            .reviews
            .find_by_user_and_product(user_id, product_id)
            .await?
            .is_some()
        {
            return Err(ShopServiceError::ReviewAlreadyExists);
        }

        let now = Utc::now();
        let review = Review {
            id: Uuid::now_v7(),
            user_id,
            product_id,
            rating,
            title: input.title.unwrap_or_default(),
            comment: input.comment.unwrap_or_default(),
            is_verified: true,
            created_at: now,
            updated_at: now,
        };
        self.reviews.create(&review).await?;
        Ok(review)
    }
}

// ── GetReview / ListProductReviews / ListUserReviews ─────────────────────────

pub struct GetReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> GetReviewUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Review, ShopServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ShopServiceError::ReviewNotFound)
    }
}

pub struct ListProductReviewsUseCase<R: ReviewRepository, P: ProductRepository> {
    pub reviews: R,
    pub products: P,
}

impl<R: ReviewRepository, P: ProductRepository> ListProductReviewsUseCase<R, P> {
    pub async fn execute(&self, product_id: Uuid) -> Result<Vec<Review>, ShopServiceError> {
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(ShopServiceError::ProductNotFound);
        }
        self.reviews.list_by_product(product_id).await
    }
}

pub struct ListUserReviewsUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> ListUserReviewsUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Review>, ShopServiceError> {
        self.repo.list_by_user(user_id).await
    }
}

// ── UpdateReview ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateReviewInput {
    pub rating: Option<i16>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

pub struct UpdateReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> UpdateReviewUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: UpdateReviewInput,
    ) -> Result<Review, ShopServiceError> {
        let mut review = owned_review(&self.repo, id, user_id).await?;
        if let Some(rating) = input.rating {
            review.rating = valid_rating(rating)?;
        }
        if let Some(title) = input.title {
            review.title = title;
        }
        if let Some(comment) = input.comment {
            review.comment = comment;
        }
        review.updated_at = Utc::now();
        self.repo.update(&review).await?;
        Ok(review)
    }
}

// ── DeleteReview ─────────────────────────────────────────────────────────────

pub struct DeleteReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> DeleteReviewUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, id: Uuid) -> Result<(), ShopServiceError> {
        owned_review(&self.repo, id, user_id).await?;
        if !self.repo.soft_delete(id).await? {
            return Err(ShopServiceError::ReviewNotFound);
        }
        Ok(())
    }
}
