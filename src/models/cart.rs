use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Per-line quantity cap enforced by the increment endpoint.
pub const MAX_LINE_QUANTITY: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: u32,
}

/// One cart per user (unique constraint); deleted wholesale when an order
/// is placed successfully.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Json<Vec<CartItem>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn line(&self, product_id: Uuid, variant_id: Uuid) -> Option<&CartItem> {
        self.items.0.iter().find(|i| i.product_id == product_id && i.variant_id == variant_id)
    }
}
