//! Promotional reels and their engagement tracking. Watching a reel to the
//! end earns exactly one brownie point per user per reel.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::storage::{Storage, UploadedFile};
use crate::error::{AppError, Result};
use crate::models::loyalty::ENTRY_EARNED;
use crate::models::reel::Reel;
use crate::pagination::{PageQuery, Paginated};

const MEDIA_FOLDER: &str = "reels";

pub struct ReelService {
    db: PgPool,
    storage: Storage,
}

impl ReelService {
    pub fn new(db: PgPool, storage: Storage) -> Self {
        Self { db, storage }
    }

    async fn live_reel(&self, id: Uuid) -> Result<Reel> {
        sqlx::query_as::<_, Reel>("SELECT * FROM reels WHERE id = $1 AND NOT is_deleted AND is_active")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Reel not found or inactive".into()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Reel> {
        self.live_reel(id).await
    }

    pub async fn list(&self, page: PageQuery, include_inactive: bool) -> Result<Paginated<Reel>> {
        let (current, limit, offset) = page.resolve();
        let reels = sqlx::query_as::<_, Reel>(
            "SELECT * FROM reels WHERE NOT is_deleted AND (is_active OR $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(include_inactive)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reels WHERE NOT is_deleted AND (is_active OR $1)")
                .bind(include_inactive)
                .fetch_one(&self.db)
                .await?;
        Ok(Paginated::new(reels, current, limit, total))
    }

    /// Returns the reel and whether it is now liked by the user.
    pub async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<(Reel, bool)> {
        let reel = self.live_reel(id).await?;
        let liked = reel.likes.contains(&user_id);
        let sql = if liked {
            "UPDATE reels SET likes = array_remove(likes, $1), updated_at = NOW() WHERE id = $2 RETURNING *"
        } else {
            "UPDATE reels SET likes = array_append(likes, $1), updated_at = NOW() WHERE id = $2 RETURNING *"
        };
        let updated = sqlx::query_as::<_, Reel>(sql).bind(user_id).bind(id).fetch_one(&self.db).await?;
        Ok((updated, !liked))
    }

    /// Idempotent view tracking.
    pub async fn add_view(&self, id: Uuid, user_id: Uuid) -> Result<Reel> {
        let reel = self.live_reel(id).await?;
        if reel.views.contains(&user_id) {
            return Ok(reel);
        }
        Ok(sqlx::query_as::<_, Reel>(
            "UPDATE reels SET views = array_append(views, $1), updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(user_id)
        .bind(id)
        .fetch_one(&self.db)
        .await?)
    }

    /// Marks the reel fully watched and awards the brownie point if this
    /// user has not earned one for it before. Returns whether a point was
    /// earned this time.
    pub async fn mark_fully_watched(&self, id: Uuid, user_id: Uuid) -> Result<(Reel, bool)> {
        let mut tx = self.db.begin().await?;
        let reel = sqlx::query_as::<_, Reel>("SELECT * FROM reels WHERE id = $1 AND NOT is_deleted AND is_active")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Reel not found or inactive".into()))?;

        if reel.fully_watched.contains(&user_id) {
            tx.commit().await?;
            return Ok((reel, false));
        }

        let updated = sqlx::query_as::<_, Reel>(
            "UPDATE reels SET fully_watched = array_append(fully_watched, $1), \
             views = CASE WHEN $1 = ANY(views) THEN views ELSE array_append(views, $1) END, \
             updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(user_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let already_earned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM brownie_points WHERE user_id = $1 AND entry_type = $2 AND reel_id = $3",
        )
        .bind(user_id)
        .bind(ENTRY_EARNED)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut earned = false;
        if already_earned.is_none() {
            sqlx::query("UPDATE users SET brownie_points = brownie_points + 1, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO brownie_points (id, user_id, entry_type, points, reel_id, comment) \
                 VALUES ($1, $2, $3, 1, $4, 'Point earned for watching a reel')",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(ENTRY_EARNED)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            earned = true;
        }

        tx.commit().await?;
        Ok((updated, earned))
    }

    pub async fn create(
        &self,
        title: &str,
        subtitle: Option<&str>,
        video: UploadedFile,
        thumbnail: UploadedFile,
    ) -> Result<Reel> {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".into()));
        }
        let video = self.storage.put_file(video, MEDIA_FOLDER).await?;
        let thumbnail = self.storage.put_file(thumbnail, MEDIA_FOLDER).await?;
        Ok(sqlx::query_as::<_, Reel>(
            "INSERT INTO reels (id, title, subtitle, video, thumbnail) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(title.trim())
        .bind(subtitle)
        .bind(Json(&video))
        .bind(Json(&thumbnail))
        .fetch_one(&self.db)
        .await?)
    }

    /// Replaced media deletes the superseded blobs; failures there only log.
    pub async fn update(
        &self,
        id: Uuid,
        title: Option<&str>,
        subtitle: Option<&str>,
        video: Option<UploadedFile>,
        thumbnail: Option<UploadedFile>,
    ) -> Result<Reel> {
        let reel = sqlx::query_as::<_, Reel>("SELECT * FROM reels WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Reel not found".into()))?;

        let video_media = match video {
            Some(file) => {
                if let Err(e) = self.storage.delete(&reel.video.0.filename).await {
                    tracing::warn!(key = %reel.video.0.filename, error = %e, "failed to delete superseded blob");
                }
                self.storage.put_file(file, MEDIA_FOLDER).await?
            }
            None => reel.video.0.clone(),
        };
        let thumbnail_media = match thumbnail {
            Some(file) => {
                if let Err(e) = self.storage.delete(&reel.thumbnail.0.filename).await {
                    tracing::warn!(key = %reel.thumbnail.0.filename, error = %e, "failed to delete superseded blob");
                }
                self.storage.put_file(file, MEDIA_FOLDER).await?
            }
            None => reel.thumbnail.0.clone(),
        };

        Ok(sqlx::query_as::<_, Reel>(
            "UPDATE reels SET title = COALESCE($1, title), subtitle = COALESCE($2, subtitle), video = $3, \
             thumbnail = $4, updated_at = NOW() WHERE id = $5 RETURNING *",
        )
        .bind(title)
        .bind(subtitle)
        .bind(Json(&video_media))
        .bind(Json(&thumbnail_media))
        .bind(id)
        .fetch_one(&self.db)
        .await?)
    }

    pub async fn toggle_status(&self, id: Uuid) -> Result<Reel> {
        sqlx::query_as::<_, Reel>(
            "UPDATE reels SET is_active = NOT is_active, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Reel not found".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE reels SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reel not found".into()));
        }
        Ok(())
    }
}
