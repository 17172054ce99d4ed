//! Catalog management. Variants only exist while a product is available for
//! delivery; flipping it to pickup-only clears them.

use serde::Deserialize;
use sqlx::types::Json;
use uuid::Uuid;

use crate::adapters::storage::{Storage, UploadedFile};
use crate::error::{AppError, Result};
use crate::models::product::{product_slug, Product, Variant, DELIVERY_AVAILABLE, DELIVERY_NOT_AVAILABLE, STOCK_IN, STOCK_OUT};
use crate::models::Media;
use crate::pagination::{PageQuery, Paginated};

const MEDIA_FOLDER: &str = "products";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    pub price: f64,
    pub weight: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
    pub delivery_status: Option<String>,
    pub stock_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub variants: Option<Vec<VariantInput>>,
    pub delivery_status: Option<String>,
    pub stock_status: Option<String>,
    pub is_active: Option<bool>,
    /// Keys of already-stored media to keep; everything else is replaced.
    #[serde(default)]
    pub existing_images: Vec<String>,
    #[serde(default)]
    pub existing_banner_images: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListFilter {
    pub stock_status: Option<String>,
    pub delivery_status: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

pub struct ProductService {
    db: sqlx::PgPool,
    storage: Storage,
}

impl ProductService {
    pub fn new(db: sqlx::PgPool, storage: Storage) -> Self {
        Self { db, storage }
    }

    fn build_variants(inputs: &[VariantInput]) -> Result<Vec<Variant>> {
        inputs
            .iter()
            .enumerate()
            .map(|(index, v)| {
                let weight = v.weight.trim();
                if v.price <= 0.0 || weight.is_empty() {
                    return Err(AppError::Validation(format!("Invalid variant at index {index}")));
                }
                Ok(Variant { id: Uuid::new_v4(), price: v.price, weight: weight.to_string() })
            })
            .collect()
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM products WHERE slug = $1 AND NOT is_deleted AND ($2::uuid IS NULL OR id <> $2)")
                .bind(slug)
                .bind(exclude)
                .fetch_optional(&self.db)
                .await?;
        Ok(existing.is_some())
    }

    pub async fn create(
        &self,
        input: CreateProductInput,
        images: Vec<UploadedFile>,
        banner_images: Vec<UploadedFile>,
    ) -> Result<Product> {
        if input.name.trim().is_empty() || input.description.trim().is_empty() {
            return Err(AppError::Validation("Name and description are required".into()));
        }
        let delivery_status = input.delivery_status.unwrap_or_else(|| DELIVERY_AVAILABLE.to_string());
        if delivery_status != DELIVERY_AVAILABLE && delivery_status != DELIVERY_NOT_AVAILABLE {
            return Err(AppError::Validation("Invalid delivery status".into()));
        }
        let stock_status = input.stock_status.unwrap_or_else(|| STOCK_IN.to_string());
        if stock_status != STOCK_IN && stock_status != STOCK_OUT {
            return Err(AppError::Validation("Invalid stock status".into()));
        }
        if delivery_status == DELIVERY_AVAILABLE && input.variants.is_empty() {
            return Err(AppError::Validation("Variants are required when delivery is available".into()));
        }
        let slug = product_slug(input.name.trim(), &delivery_status);
        if self.slug_taken(&slug, None).await? {
            return Err(AppError::Conflict("Product with this name and delivery status already exists".into()));
        }
        let variants =
            if delivery_status == DELIVERY_AVAILABLE { Self::build_variants(&input.variants)? } else { vec![] };

        let mut stored_images = Vec::with_capacity(images.len());
        for file in images {
            stored_images.push(self.storage.put_file(file, MEDIA_FOLDER).await?);
        }
        let mut stored_banners = Vec::with_capacity(banner_images.len());
        for file in banner_images {
            stored_banners.push(self.storage.put_file(file, MEDIA_FOLDER).await?);
        }

        Ok(sqlx::query_as::<_, Product>(
            "INSERT INTO products (id, name, description, slug, images, banner_images, variants, delivery_status, \
             stock_status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.description.trim())
        .bind(&slug)
        .bind(Json(&stored_images))
        .bind(Json(&stored_banners))
        .bind(Json(&variants))
        .bind(&delivery_status)
        .bind(&stock_status)
        .fetch_one(&self.db)
        .await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
        new_images: Vec<UploadedFile>,
        new_banner_images: Vec<UploadedFile>,
    ) -> Result<Product> {
        let product = self.get(id).await?;

        let name = input.name.as_deref().map(str::trim).filter(|n| !n.is_empty()).unwrap_or(&product.name).to_string();
        let delivery_status = input.delivery_status.clone().unwrap_or_else(|| product.delivery_status.clone());
        if delivery_status != DELIVERY_AVAILABLE && delivery_status != DELIVERY_NOT_AVAILABLE {
            return Err(AppError::Validation("Invalid delivery status".into()));
        }
        let slug = product_slug(&name, &delivery_status);
        if slug != product.slug && self.slug_taken(&slug, Some(id)).await? {
            return Err(AppError::Conflict("Product with this name and delivery status already exists".into()));
        }

        // Pickup-only products carry no variants.
        let variants = if delivery_status == DELIVERY_AVAILABLE {
            match &input.variants {
                Some(inputs) => Self::build_variants(inputs)?,
                None => product.variants.0.clone(),
            }
        } else {
            vec![]
        };

        let images = self.replace_media(product.images.0.clone(), &input.existing_images, new_images).await?;
        let banner_images =
            self.replace_media(product.banner_images.0.clone(), &input.existing_banner_images, new_banner_images).await?;

        sqlx::query_as::<_, Product>(
            "UPDATE products SET name = $1, description = COALESCE($2, description), slug = $3, images = $4, \
             banner_images = $5, variants = $6, delivery_status = $7, stock_status = COALESCE($8, stock_status), \
             is_active = COALESCE($9, is_active), updated_at = NOW() WHERE id = $10 AND NOT is_deleted RETURNING *",
        )
        .bind(&name)
        .bind(input.description.as_deref())
        .bind(&slug)
        .bind(Json(&images))
        .bind(Json(&banner_images))
        .bind(Json(&variants))
        .bind(&delivery_status)
        .bind(input.stock_status.as_deref())
        .bind(input.is_active)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    /// Keeps the listed existing blobs, uploads the new ones, and deletes
    /// whatever was superseded. Blob deletion failures only log.
    async fn replace_media(
        &self,
        current: Vec<Media>,
        keep: &[String],
        new_files: Vec<UploadedFile>,
    ) -> Result<Vec<Media>> {
        if keep.is_empty() && new_files.is_empty() {
            return Ok(current);
        }
        let (kept, dropped): (Vec<Media>, Vec<Media>) =
            current.into_iter().partition(|m| keep.contains(&m.filename) || keep.contains(&m.url));
        for media in dropped {
            if let Err(e) = self.storage.delete(&media.filename).await {
                tracing::warn!(key = %media.filename, error = %e, "failed to delete superseded blob");
            }
        }
        let mut result = kept;
        for file in new_files {
            result.push(self.storage.put_file(file, MEDIA_FOLDER).await?);
        }
        Ok(result)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    pub async fn list(&self, filter: &ProductListFilter, page: PageQuery) -> Result<Paginated<Product>> {
        let (current, limit, offset) = page.resolve();
        let pattern = filter.search.as_deref().map(|s| format!("%{}%", s.trim()));
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE NOT is_deleted \
             AND ($1::text IS NULL OR stock_status = $1) \
             AND ($2::text IS NULL OR delivery_status = $2) \
             AND ($3::boolean IS NULL OR is_active = $3) \
             AND ($4::text IS NULL OR name ILIKE $4) \
             ORDER BY created_at DESC LIMIT $5 OFFSET $6",
        )
        .bind(filter.stock_status.as_deref())
        .bind(filter.delivery_status.as_deref())
        .bind(filter.is_active)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE NOT is_deleted \
             AND ($1::text IS NULL OR stock_status = $1) \
             AND ($2::text IS NULL OR delivery_status = $2) \
             AND ($3::boolean IS NULL OR is_active = $3) \
             AND ($4::text IS NULL OR name ILIKE $4)",
        )
        .bind(filter.stock_status.as_deref())
        .bind(filter.delivery_status.as_deref())
        .bind(filter.is_active)
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(Paginated::new(products, current, limit, total))
    }

    pub async fn list_all_active(&self) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE NOT is_deleted AND is_active ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?)
    }

    pub async fn toggle_status(&self, id: Uuid) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            "UPDATE products SET is_active = NOT is_active, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE products SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found".into()));
        }
        Ok(())
    }
}
