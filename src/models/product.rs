use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::Media;

pub const DELIVERY_AVAILABLE: &str = "available-for-delivery";
pub const DELIVERY_NOT_AVAILABLE: &str = "not-available-for-delivery";
pub const STOCK_IN: &str = "in-stock";
pub const STOCK_OUT: &str = "out-of-stock";

/// A purchasable SKU: a specific weight at a specific price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: Uuid,
    pub price: f64,
    pub weight: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub images: Json<Vec<Media>>,
    pub banner_images: Json<Vec<Media>>,
    /// Only meaningful while delivery is available; cleared on toggle.
    pub variants: Json<Vec<Variant>>,
    pub delivery_status: String,
    pub stock_status: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn variant(&self, variant_id: Uuid) -> Option<&Variant> {
        self.variants.0.iter().find(|v| v.id == variant_id)
    }

    pub fn is_orderable(&self) -> bool {
        self.is_active && !self.is_deleted && self.stock_status == STOCK_IN
    }
}

/// Slug derivation: lowercased name plus a delivery-mode suffix, so the same
/// dessert can exist once as a delivery listing and once as pickup-only.
pub fn product_slug(name: &str, delivery_status: &str) -> String {
    let suffix = if delivery_status == DELIVERY_AVAILABLE { "delivery" } else { "pickup" };
    format!("{}-{suffix}", super::slugify(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_includes_delivery_suffix() {
        assert_eq!(product_slug("Mango  Kulfi!", DELIVERY_AVAILABLE), "mango-kulfi-delivery");
        assert_eq!(product_slug("Mango Kulfi", DELIVERY_NOT_AVAILABLE), "mango-kulfi-pickup");
    }

    #[test]
    fn orderable_requires_active_stocked() {
        let mut p = sample();
        assert!(p.is_orderable());
        p.stock_status = STOCK_OUT.into();
        assert!(!p.is_orderable());
        p.stock_status = STOCK_IN.into();
        p.is_deleted = true;
        assert!(!p.is_orderable());
    }

    fn sample() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Mango Kulfi".into(),
            description: "desc".into(),
            slug: "mango-kulfi-delivery".into(),
            images: Json(vec![]),
            banner_images: Json(vec![]),
            variants: Json(vec![]),
            delivery_status: DELIVERY_AVAILABLE.into(),
            stock_status: STOCK_IN.into(),
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
