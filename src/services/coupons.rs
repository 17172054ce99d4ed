//! Coupon management and the user-facing apply/preview check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::coupon::{Coupon, DISCOUNT_FLAT, DISCOUNT_PERCENTAGE};
use crate::pagination::{PageQuery, Paginated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
    #[serde(default)]
    pub min_purchase_amount: f64,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponPreview {
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
    pub discount_amount: f64,
    pub min_purchase_amount: f64,
    pub expires_at: DateTime<Utc>,
}

pub struct CouponService {
    db: PgPool,
}

impl CouponService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn validate(input: &CouponInput) -> Result<()> {
        if input.code.trim().is_empty() {
            return Err(AppError::Validation("Coupon code is required".into()));
        }
        match input.discount_type.as_str() {
            DISCOUNT_PERCENTAGE => {
                if !(1.0..=100.0).contains(&input.discount_value) {
                    return Err(AppError::Validation("Percentage discount must be between 1 and 100".into()));
                }
            }
            DISCOUNT_FLAT => {
                if input.discount_value <= 0.0 {
                    return Err(AppError::Validation("Flat discount must be positive".into()));
                }
            }
            other => return Err(AppError::Validation(format!("Unknown discount type '{other}'"))),
        }
        Ok(())
    }

    pub async fn create(&self, input: CouponInput) -> Result<Coupon> {
        Self::validate(&input)?;
        let code = input.code.trim().to_uppercase();
        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM coupons WHERE LOWER(code) = LOWER($1) AND NOT is_deleted")
                .bind(&code)
                .fetch_optional(&self.db)
                .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("A coupon with this code already exists".into()));
        }
        Ok(sqlx::query_as::<_, Coupon>(
            "INSERT INTO coupons (id, code, slug, discount_type, discount_value, min_purchase_amount, starts_at, \
             expires_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&code)
        .bind(code.to_lowercase())
        .bind(&input.discount_type)
        .bind(input.discount_value)
        .bind(input.min_purchase_amount)
        .bind(input.starts_at.unwrap_or_else(Utc::now))
        .bind(input.expires_at)
        .fetch_one(&self.db)
        .await?)
    }

    pub async fn update(&self, id: Uuid, input: CouponInput) -> Result<Coupon> {
        Self::validate(&input)?;
        let code = input.code.trim().to_uppercase();
        let clash: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM coupons WHERE LOWER(code) = LOWER($1) AND id <> $2 AND NOT is_deleted")
                .bind(&code)
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        if clash.is_some() {
            return Err(AppError::Conflict("A coupon with this code already exists".into()));
        }
        sqlx::query_as::<_, Coupon>(
            "UPDATE coupons SET code = $1, slug = $2, discount_type = $3, discount_value = $4, \
             min_purchase_amount = $5, starts_at = COALESCE($6, starts_at), expires_at = $7, updated_at = NOW() \
             WHERE id = $8 AND NOT is_deleted RETURNING *",
        )
        .bind(&code)
        .bind(code.to_lowercase())
        .bind(&input.discount_type)
        .bind(input.discount_value)
        .bind(input.min_purchase_amount)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Coupon not found".into()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Coupon> {
        sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".into()))
    }

    pub async fn list(&self, page: PageQuery, is_active: Option<bool>, search: Option<&str>) -> Result<Paginated<Coupon>> {
        let (current, limit, offset) = page.resolve();
        let pattern = search.map(|s| format!("%{}%", s.trim()));
        let coupons = sqlx::query_as::<_, Coupon>(
            "SELECT * FROM coupons WHERE NOT is_deleted AND ($1::boolean IS NULL OR is_active = $1) \
             AND ($2::text IS NULL OR code ILIKE $2) ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(is_active)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupons WHERE NOT is_deleted AND ($1::boolean IS NULL OR is_active = $1) \
             AND ($2::text IS NULL OR code ILIKE $2)",
        )
        .bind(is_active)
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(Paginated::new(coupons, current, limit, total))
    }

    pub async fn toggle_status(&self, id: Uuid) -> Result<Coupon> {
        sqlx::query_as::<_, Coupon>(
            "UPDATE coupons SET is_active = NOT is_active, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Coupon not found".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("UPDATE coupons SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Coupon not found".into()));
        }
        Ok(())
    }

    /// Pre-checkout eligibility check; mirrors the rules `create_order`
    /// enforces, without redeeming anything.
    pub async fn apply(&self, user_id: Uuid, code: &str, cart_amount: Option<f64>) -> Result<CouponPreview> {
        if code.trim().is_empty() {
            return Err(AppError::Validation("Coupon code is required".into()));
        }
        let coupon = sqlx::query_as::<_, Coupon>(
            "SELECT * FROM coupons WHERE LOWER(code) = LOWER($1) AND is_active AND NOT is_deleted",
        )
        .bind(code.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid or inactive coupon".into()))?;

        let now = Utc::now();
        if coupon.starts_at > now {
            return Err(AppError::Validation("Coupon is not active yet".into()));
        }
        if coupon.expires_at < now {
            return Err(AppError::Validation("Coupon has expired".into()));
        }
        if let Some(amount) = cart_amount {
            if amount < coupon.min_purchase_amount {
                return Err(AppError::Validation(format!(
                    "Minimum purchase amount for this coupon is {}",
                    coupon.min_purchase_amount
                )));
            }
        }
        if coupon.used_by_user(user_id) {
            return Err(AppError::Validation("You have already used this coupon".into()));
        }
        let discount_amount = coupon.discount_for(cart_amount.unwrap_or(0.0));
        Ok(CouponPreview {
            code: coupon.code,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            discount_amount,
            min_purchase_amount: coupon.min_purchase_amount,
            expires_at: coupon.expires_at,
        })
    }
}
