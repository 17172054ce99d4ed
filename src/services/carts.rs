//! Shopping cart: one document per user, re-priced from the live catalog on
//! every read.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::cart::{Cart, CartItem, MAX_LINE_QUANTITY};
use crate::models::product::{Product, Variant};
use crate::models::Media;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCartItem {
    pub product_id: Uuid,
    pub name: String,
    pub images: Vec<Media>,
    pub variant_id: Uuid,
    pub price: f64,
    pub weight: String,
    pub quantity: u32,
    pub status: String,
    pub total: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCart {
    pub cart_id: Option<Uuid>,
    pub items: Vec<DetailedCartItem>,
    pub cart_total: f64,
}

pub struct CartService {
    db: PgPool,
}

impl CartService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<Cart>> {
        Ok(sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn save_items(&self, cart_id: Uuid, items: &[CartItem]) -> Result<Cart> {
        Ok(sqlx::query_as::<_, Cart>(
            "UPDATE carts SET items = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(Json(items))
        .bind(cart_id)
        .fetch_one(&self.db)
        .await?)
    }

    async fn product_variant(&self, product_id: Uuid, variant_id: Uuid) -> Result<(Product, Variant)> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND NOT is_deleted")
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
        let variant = product
            .variant(variant_id)
            .ok_or_else(|| AppError::NotFound("Variant not found for this product".into()))?
            .clone();
        Ok((product, variant))
    }

    pub async fn add_item(&self, user_id: Uuid, product_id: Uuid, variant_id: Uuid, quantity: u32) -> Result<Cart> {
        if quantity == 0 {
            return Err(AppError::Validation("Quantity must be at least 1".into()));
        }
        let (product, _) = self.product_variant(product_id, variant_id).await?;
        if product.stock_status != crate::models::product::STOCK_IN {
            return Err(AppError::Validation("Product is out of stock".into()));
        }

        match self.find(user_id).await? {
            Some(cart) => {
                let mut items = cart.items.0.clone();
                match items.iter_mut().find(|i| i.product_id == product_id && i.variant_id == variant_id) {
                    Some(line) => line.quantity += quantity,
                    None => items.push(CartItem { product_id, variant_id, quantity }),
                }
                self.save_items(cart.id, &items).await
            }
            None => Ok(sqlx::query_as::<_, Cart>(
                "INSERT INTO carts (id, user_id, items) VALUES ($1, $2, $3) RETURNING *",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(Json(vec![CartItem { product_id, variant_id, quantity }]))
            .fetch_one(&self.db)
            .await?),
        }
    }

    /// `inc` caps the line at 10; `dec` at quantity 1 removes the line.
    pub async fn update_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        variant_id: Uuid,
        action: &str,
    ) -> Result<Cart> {
        if action != "inc" && action != "dec" {
            return Err(AppError::Validation("Invalid status".into()));
        }
        let cart = self.find(user_id).await?.ok_or_else(|| AppError::NotFound("Cart or item not found".into()))?;
        let mut items = cart.items.0.clone();
        let index = items
            .iter()
            .position(|i| i.product_id == product_id && i.variant_id == variant_id)
            .ok_or_else(|| AppError::NotFound("Item not found in cart".into()))?;
        if action == "inc" {
            if items[index].quantity >= MAX_LINE_QUANTITY {
                return Err(AppError::Validation(format!("Cannot increase beyond {MAX_LINE_QUANTITY}")));
            }
            items[index].quantity += 1;
        } else if items[index].quantity == 1 {
            items.remove(index);
        } else {
            items[index].quantity -= 1;
        }
        self.save_items(cart.id, &items).await
    }

    pub async fn remove_item(&self, user_id: Uuid, product_id: Uuid, variant_id: Uuid) -> Result<Cart> {
        let cart = self.find(user_id).await?.ok_or_else(|| AppError::NotFound("Cart or item not found".into()))?;
        let mut items = cart.items.0.clone();
        let before = items.len();
        items.retain(|i| !(i.product_id == product_id && i.variant_id == variant_id));
        if items.len() == before {
            return Err(AppError::NotFound("Item not found in cart".into()));
        }
        self.save_items(cart.id, &items).await
    }

    /// Re-prices every line from the current catalog; lines whose product or
    /// variant vanished are silently skipped.
    pub async fn detailed(&self, user_id: Uuid) -> Result<DetailedCart> {
        let Some(cart) = self.find(user_id).await? else {
            return Ok(DetailedCart { cart_id: None, items: vec![], cart_total: 0.0 });
        };
        let mut detailed = Vec::new();
        for line in &cart.items.0 {
            let Ok((product, variant)) = self.product_variant(line.product_id, line.variant_id).await else {
                continue;
            };
            let total = variant.price * line.quantity as f64;
            detailed.push(DetailedCartItem {
                product_id: product.id,
                name: product.name,
                images: product.images.0,
                variant_id: variant.id,
                price: variant.price,
                weight: variant.weight,
                quantity: line.quantity,
                status: product.stock_status,
                total,
            });
        }
        let cart_total = detailed.iter().map(|i| i.total).sum();
        Ok(DetailedCart { cart_id: Some(cart.id), items: detailed, cart_total })
    }

    pub async fn count(&self, user_id: Uuid) -> Result<usize> {
        Ok(self.find(user_id).await?.map(|c| c.items.0.len()).unwrap_or(0))
    }
}
