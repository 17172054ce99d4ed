//! Shipping-box catalog. Item-count ranges must stay disjoint so checkout
//! can auto-select a single box.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::shipping_box::ShippingBox;
use crate::pagination::{PageQuery, Paginated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxInput {
    pub label: String,
    pub length_cm: f64,
    pub breadth_cm: f64,
    pub height_cm: f64,
    pub box_weight_kg: f64,
    pub item_count_min: i32,
    pub item_count_max: i32,
}

pub struct BoxService {
    db: PgPool,
}

impl BoxService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn validate(input: &BoxInput) -> Result<()> {
        if input.label.trim().is_empty() {
            return Err(AppError::Validation("Label is required".into()));
        }
        if input.item_count_min < 1 || input.item_count_max < input.item_count_min {
            return Err(AppError::Validation("Invalid item count range".into()));
        }
        Ok(())
    }

    async fn label_taken(&self, label: &str, exclude: Option<Uuid>) -> Result<bool> {
        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM boxes WHERE label = $1 AND ($2::uuid IS NULL OR id <> $2)")
                .bind(label)
                .bind(exclude)
                .fetch_optional(&self.db)
                .await?;
        Ok(existing.is_some())
    }

    async fn range_overlaps(&self, min: i32, max: i32, exclude: Option<Uuid>) -> Result<bool> {
        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM boxes WHERE item_count_min <= $1 AND item_count_max >= $2 \
             AND ($3::uuid IS NULL OR id <> $3)",
        )
        .bind(max)
        .bind(min)
        .bind(exclude)
        .fetch_optional(&self.db)
        .await?;
        Ok(existing.is_some())
    }

    pub async fn create(&self, input: BoxInput) -> Result<ShippingBox> {
        Self::validate(&input)?;
        if self.label_taken(input.label.trim(), None).await? {
            return Err(AppError::Validation("A box with this label already exists".into()));
        }
        if self.range_overlaps(input.item_count_min, input.item_count_max, None).await? {
            return Err(AppError::Validation("A box with an overlapping item count range already exists".into()));
        }
        Ok(sqlx::query_as::<_, ShippingBox>(
            "INSERT INTO boxes (id, label, length_cm, breadth_cm, height_cm, box_weight_kg, item_count_min, \
             item_count_max) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(input.label.trim())
        .bind(input.length_cm)
        .bind(input.breadth_cm)
        .bind(input.height_cm)
        .bind(input.box_weight_kg)
        .bind(input.item_count_min)
        .bind(input.item_count_max)
        .fetch_one(&self.db)
        .await?)
    }

    pub async fn update(&self, id: Uuid, input: BoxInput) -> Result<ShippingBox> {
        Self::validate(&input)?;
        if self.label_taken(input.label.trim(), Some(id)).await? {
            return Err(AppError::Validation("A box with this label already exists".into()));
        }
        if self.range_overlaps(input.item_count_min, input.item_count_max, Some(id)).await? {
            return Err(AppError::Validation("A box with an overlapping item count range already exists".into()));
        }
        sqlx::query_as::<_, ShippingBox>(
            "UPDATE boxes SET label = $1, length_cm = $2, breadth_cm = $3, height_cm = $4, box_weight_kg = $5, \
             item_count_min = $6, item_count_max = $7, updated_at = NOW() WHERE id = $8 RETURNING *",
        )
        .bind(input.label.trim())
        .bind(input.length_cm)
        .bind(input.breadth_cm)
        .bind(input.height_cm)
        .bind(input.box_weight_kg)
        .bind(input.item_count_min)
        .bind(input.item_count_max)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Box not found".into()))
    }

    pub async fn get(&self, id: Uuid) -> Result<ShippingBox> {
        sqlx::query_as::<_, ShippingBox>("SELECT * FROM boxes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Box not found".into()))
    }

    pub async fn list(&self, page: PageQuery) -> Result<Paginated<ShippingBox>> {
        let (current, limit, offset) = page.resolve();
        let boxes =
            sqlx::query_as::<_, ShippingBox>("SELECT * FROM boxes ORDER BY created_at DESC LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.db)
                .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM boxes").fetch_one(&self.db).await?;
        Ok(Paginated::new(boxes, current, limit, total))
    }

    // Boxes are plain catalog rows; deletion is physical.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM boxes WHERE id = $1").bind(id).execute(&self.db).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Box not found".into()));
        }
        Ok(())
    }
}
