//! Physical store directory, listable by proximity.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::storage::{Storage, UploadedFile};
use crate::domain::geo;
use crate::error::{AppError, Result};
use crate::models::store::Store;
use crate::pagination::{PageQuery, Paginated};

const MEDIA_FOLDER: &str = "stores";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInput {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreWithDistance {
    #[serde(flatten)]
    pub store: Store,
    pub distance_km: f64,
}

pub struct StoreService {
    db: PgPool,
    storage: Storage,
}

impl StoreService {
    pub fn new(db: PgPool, storage: Storage) -> Self {
        Self { db, storage }
    }

    pub async fn create(&self, input: StoreInput, images: Vec<UploadedFile>) -> Result<Store> {
        if input.name.trim().is_empty() || input.address.trim().is_empty() {
            return Err(AppError::Validation("Name and address are required".into()));
        }
        let mut stored = Vec::with_capacity(images.len());
        for file in images {
            stored.push(self.storage.put_file(file, MEDIA_FOLDER).await?);
        }
        Ok(sqlx::query_as::<_, Store>(
            "INSERT INTO stores (id, name, address, latitude, longitude, images, contact, product_ids) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.address.trim())
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(Json(&stored))
        .bind(input.contact.trim())
        .bind(&input.product_ids)
        .fetch_one(&self.db)
        .await?)
    }

    pub async fn update(&self, id: Uuid, input: StoreInput, new_images: Vec<UploadedFile>) -> Result<Store> {
        let store = self.get(id).await?;
        let images = if new_images.is_empty() {
            store.images.0.clone()
        } else {
            for media in &store.images.0 {
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
        sqlx::query_as::<_, Store>(
            "UPDATE stores SET name = $1, address = $2, latitude = $3, longitude = $4, images = $5, contact = $6, \
             product_ids = $7, updated_at = NOW() WHERE id = $8 AND NOT is_deleted RETURNING *",
        )
        .bind(input.name.trim())
        .bind(input.address.trim())
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(Json(&images))
        .bind(input.contact.trim())
        .bind(&input.product_ids)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".into()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Store> {
        sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Store not found".into()))
    }

    pub async fn list(&self, page: PageQuery, is_active: Option<bool>, search: Option<&str>) -> Result<Paginated<Store>> {
        let (current, limit, offset) = page.resolve();
        let pattern = search.map(|s| format!("%{}%", s.trim()));
        let stores = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE NOT is_deleted AND ($1::boolean IS NULL OR is_active = $1) \
             AND ($2::text IS NULL OR name ILIKE $2) ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(is_active)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stores WHERE NOT is_deleted AND ($1::boolean IS NULL OR is_active = $1) \
             AND ($2::text IS NULL OR name ILIKE $2)",
        )
        .bind(is_active)
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(Paginated::new(stores, current, limit, total))
    }

    /// All active stores ranked by great-circle distance from the caller,
    /// paginated in memory after the sort.
    pub async fn nearby(&self, latitude: f64, longitude: f64, page: PageQuery) -> Result<Paginated<StoreWithDistance>> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(AppError::Validation("Invalid coordinates".into()));
        }
        let stores = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE NOT is_deleted AND is_active")
            .fetch_all(&self.db)
            .await?;
        let mut ranked: Vec<StoreWithDistance> = stores
            .into_iter()
            .map(|store| {
                let distance_km = geo::haversine_km(latitude, longitude, store.latitude, store.longitude);
                StoreWithDistance { store, distance_km }
            })
            .collect();
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        let (current, limit, offset) = page.resolve();
        let total = ranked.len() as i64;
        let items = ranked.into_iter().skip(offset as usize).take(limit as usize).collect();
        Ok(Paginated::new(items, current, limit, total))
    }

    pub async fn toggle_status(&self, id: Uuid) -> Result<Store> {
        sqlx::query_as::<_, Store>(
            "UPDATE stores SET is_active = NOT is_active, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE stores SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Store not found".into()));
        }
        Ok(())
    }
}
