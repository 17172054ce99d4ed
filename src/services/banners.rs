//! Homepage banners.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::storage::{Storage, UploadedFile};
use crate::error::{AppError, Result};
use crate::models::banner::Banner;

const MEDIA_FOLDER: &str = "banners";

pub struct BannerService {
    db: PgPool,
    storage: Storage,
}

impl BannerService {
    pub fn new(db: PgPool, storage: Storage) -> Self {
        Self { db, storage }
    }

    pub async fn create(&self, image: UploadedFile) -> Result<Banner> {
        let media = self.storage.put_file(image, MEDIA_FOLDER).await?;
        Ok(sqlx::query_as::<_, Banner>("INSERT INTO banners (id, image) VALUES ($1, $2) RETURNING *")
            .bind(Uuid::new_v4())
            .bind(Json(&media))
            .fetch_one(&self.db)
            .await?)
    }

    pub async fn list_active(&self) -> Result<Vec<Banner>> {
        Ok(sqlx::query_as::<_, Banner>("SELECT * FROM banners WHERE is_active ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Banner>> {
        Ok(sqlx::query_as::<_, Banner>("SELECT * FROM banners ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn toggle_status(&self, id: Uuid) -> Result<Banner> {
        sqlx::query_as::<_, Banner>(
            "UPDATE banners SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Banner not found".into()))
    }

    /// Banners have no soft-delete flag; the row and its blob both go.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let banner = sqlx::query_as::<_, Banner>("DELETE FROM banners WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Banner not found".into()))?;
        if let Err(e) = self.storage.delete(&banner.image.0.filename).await {
            tracing::warn!(key = %banner.image.0.filename, error = %e, "failed to delete banner blob");
        }
        Ok(())
    }
}
