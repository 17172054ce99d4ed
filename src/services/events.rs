//! Tasting-event listings.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::storage::{Storage, UploadedFile};
use crate::error::{AppError, Result};
use crate::models::event::{Event, EventContact, EventLocation, EVENT_COMPLETED, EVENT_LIVE};
use crate::models::slugify;
use crate::pagination::{PageQuery, Paginated};

const MEDIA_FOLDER: &str = "events";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub event_date: DateTime<Utc>,
    pub from_time: String,
    pub total_hours: String,
    #[serde(default)]
    pub age_limit: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub prohibited_items: Vec<String>,
    pub location: EventLocation,
    pub contact_details: Option<EventContact>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub max_capacity: i32,
}

pub struct EventService {
    db: PgPool,
    storage: Storage,
}

impl EventService {
    pub fn new(db: PgPool, storage: Storage) -> Self {
        Self { db, storage }
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM events WHERE slug = $1 AND NOT is_deleted AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_optional(&self.db)
        .await?;
        Ok(existing.is_some())
    }

    pub async fn create(&self, input: EventInput, images: Vec<UploadedFile>) -> Result<Event> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".into()));
        }
        let slug = slugify(input.title.trim());
        if self.slug_taken(&slug, None).await? {
            return Err(AppError::Conflict("An event with this title already exists".into()));
        }
        let mut stored = Vec::with_capacity(images.len());
        for file in images {
            stored.push(self.storage.put_file(file, MEDIA_FOLDER).await?);
        }
        Ok(sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, title, slug, description, tags, event_date, from_time, total_hours, \
             age_limit, languages, prohibited_items, location, contact_details, price, images, max_capacity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(input.title.trim())
        .bind(&slug)
        .bind(&input.description)
        .bind(&input.tags)
        .bind(input.event_date)
        .bind(&input.from_time)
        .bind(&input.total_hours)
        .bind(&input.age_limit)
        .bind(&input.languages)
        .bind(&input.prohibited_items)
        .bind(Json(&input.location))
        .bind(input.contact_details.as_ref().map(Json))
        .bind(input.price)
        .bind(Json(&stored))
        .bind(input.max_capacity)
        .fetch_one(&self.db)
        .await?)
    }

    pub async fn update(&self, id: Uuid, input: EventInput, new_images: Vec<UploadedFile>) -> Result<Event> {
        let event = self.get(id).await?;
        let slug = slugify(input.title.trim());
        if slug != event.slug && self.slug_taken(&slug, Some(id)).await? {
            return Err(AppError::Conflict("An event with this title already exists".into()));
        }
        let images = if new_images.is_empty() {
            event.images.0.clone()
        } else {
            for media in &event.images.0 {
                if let Err(e) = self.storage.delete(&media.filename).await {
                    tracing::warn!(key = %media.filename, error = %e, "failed to delete superseded blob");
                }
            }
            let mut stored = Vec::with_capacity(new_images.len());
            for file in new_images {
                stored.push(self.storage.put_file(file, MEDIA_FOLDER).await?);
            }
            stored
        };
        sqlx::query_as::<_, Event>(
            "UPDATE events SET title = $1, slug = $2, description = $3, tags = $4, event_date = $5, \
             from_time = $6, total_hours = $7, age_limit = $8, languages = $9, prohibited_items = $10, \
             location = $11, contact_details = $12, price = $13, images = $14, max_capacity = $15, \
             updated_at = NOW() WHERE id = $16 AND NOT is_deleted RETURNING *",
        )
        .bind(input.title.trim())
        .bind(&slug)
        .bind(&input.description)
        .bind(&input.tags)
        .bind(input.event_date)
        .bind(&input.from_time)
        .bind(&input.total_hours)
        .bind(&input.age_limit)
        .bind(&input.languages)
        .bind(&input.prohibited_items)
        .bind(Json(&input.location))
        .bind(input.contact_details.as_ref().map(Json))
        .bind(input.price)
        .bind(Json(&images))
        .bind(input.max_capacity)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))
    }

    pub async fn list(&self, page: PageQuery, status: Option<&str>, search: Option<&str>) -> Result<Paginated<Event>> {
        if let Some(s) = status {
            if s != EVENT_LIVE && s != EVENT_COMPLETED {
                return Err(AppError::Validation("Invalid event status".into()));
            }
        }
        let (current, limit, offset) = page.resolve();
        let pattern = search.map(|s| format!("%{}%", s.trim()));
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE NOT is_deleted AND ($1::text IS NULL OR status = $1) \
             AND ($2::text IS NULL OR title ILIKE $2) ORDER BY event_date DESC LIMIT $3 OFFSET $4",
        )
        .bind(status)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE NOT is_deleted AND ($1::text IS NULL OR status = $1) \
             AND ($2::text IS NULL OR title ILIKE $2)",
        )
        .bind(status)
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(Paginated::new(events, current, limit, total))
    }

    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<Event> {
        if status != EVENT_LIVE && status != EVENT_COMPLETED {
            return Err(AppError::Validation("Invalid event status".into()));
        }
        sqlx::query_as::<_, Event>(
            "UPDATE events SET status = $1, updated_at = NOW() WHERE id = $2 AND NOT is_deleted RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
    }

    pub async fn toggle_status(&self, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET is_active = NOT is_active, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE events SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }
}
