//! Product and store reviews: user submission, per-star aggregation, admin
//! moderation.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::product::Product;
use crate::models::review::{Review, ReviewSubject, REVIEW_PRODUCT, REVIEW_STORE};
use crate::models::store::Store;
use crate::pagination::{PageQuery, Paginated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub review_type: String,
    pub subject_id: Uuid,
    pub review: String,
    pub rating: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub counts: [i64; 5],
    pub average: f64,
    pub total: i64,
}

pub struct ReviewService {
    db: PgPool,
}

impl ReviewService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn subject_snapshot(&self, review_type: &str, subject_id: Uuid) -> Result<ReviewSubject> {
        match review_type {
            REVIEW_PRODUCT => {
                let product =
                    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND NOT is_deleted")
                        .bind(subject_id)
                        .fetch_optional(&self.db)
                        .await?
                        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
                Ok(ReviewSubject { id: product.id, name: product.name, images: product.images.0 })
            }
            REVIEW_STORE => {
                let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1 AND NOT is_deleted")
                    .bind(subject_id)
                    .fetch_optional(&self.db)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Store not found".into()))?;
                Ok(ReviewSubject { id: store.id, name: store.name, images: store.images.0 })
            }
            other => Err(AppError::Validation(format!("Unknown review type '{other}'"))),
        }
    }

    pub async fn create(&self, user_id: Uuid, input: ReviewInput) -> Result<Review> {
        if !(1..=5).contains(&input.rating) {
            return Err(AppError::Validation("Rating must be between 1 and 5".into()));
        }
        if input.review.trim().is_empty() {
            return Err(AppError::Validation("Review text is required".into()));
        }
        let subject = self.subject_snapshot(&input.review_type, input.subject_id).await?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM reviews WHERE user_id = $1 AND review_type = $2 AND subject ->> 'id' = $3",
        )
        .bind(user_id)
        .bind(&input.review_type)
        .bind(input.subject_id.to_string())
        .fetch_optional(&self.db)
        .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("You have already reviewed this".into()));
        }

        Ok(sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, user_id, review_type, subject, review, rating) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.review_type)
        .bind(Json(&subject))
        .bind(input.review.trim())
        .bind(input.rating)
        .fetch_one(&self.db)
        .await?)
    }

    /// Visible reviews for one subject, with the per-star histogram.
    pub async fn for_subject(
        &self,
        review_type: &str,
        subject_id: Uuid,
        page: PageQuery,
    ) -> Result<(Paginated<Review>, RatingSummary)> {
        let (current, limit, offset) = page.resolve();
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE review_type = $1 AND subject ->> 'id' = $2 AND status = 'visible' \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(review_type)
        .bind(subject_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let ratings: Vec<i32> = sqlx::query_scalar(
            "SELECT rating FROM reviews WHERE review_type = $1 AND subject ->> 'id' = $2 AND status = 'visible'",
        )
        .bind(review_type)
        .bind(subject_id.to_string())
        .fetch_all(&self.db)
        .await?;

        let mut counts = [0i64; 5];
        for r in &ratings {
            if (1..=5).contains(r) {
                counts[(r - 1) as usize] += 1;
            }
        }
        let total = ratings.len() as i64;
        let average =
            if total == 0 { 0.0 } else { ratings.iter().map(|r| *r as f64).sum::<f64>() / total as f64 };
        Ok((Paginated::new(reviews, current, limit, total), RatingSummary { counts, average, total }))
    }

    pub async fn list(&self, page: PageQuery, approved: Option<bool>) -> Result<Paginated<Review>> {
        let (current, limit, offset) = page.resolve();
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE ($1::boolean IS NULL OR approved = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(approved)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE ($1::boolean IS NULL OR approved = $1)")
            .bind(approved)
            .fetch_one(&self.db)
            .await?;
        Ok(Paginated::new(reviews, current, limit, total))
    }

    /// Approving also makes the review visible; revoking hides it again.
    pub async fn set_approval(&self, id: Uuid, approved: bool) -> Result<Review> {
        let status = if approved { "visible" } else { "hidden" };
        sqlx::query_as::<_, Review>(
            "UPDATE reviews SET approved = $1, status = $2, updated_at = NOW() WHERE id = $3 RETURNING *",
        )
        .bind(approved)
        .bind(status)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1").bind(id).execute(&self.db).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Review not found".into()));
        }
        Ok(())
    }
}
