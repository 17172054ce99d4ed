use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::address::Address;
use super::coupon::CouponSnapshot;
use super::product::Variant;
use super::shipping_box::ShippingBox;
use super::Media;

/// Line-item snapshot: everything needed to render and ship the order even
/// if the product changes or disappears later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub slug: String,
    pub images: Vec<Media>,
    pub variant: Variant,
    pub quantity: u32,
    /// Line total: variant price x quantity.
    pub price: f64,
}

/// Append-only log of payment status transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryEntry {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub payment_status: String,
    pub payment_date: DateTime<Utc>,
    pub comment: String,
}

/// Courier-side state, populated by the post-payment booking step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub courier_name: Option<String>,
    pub awb_code: Option<String>,
    pub shipment_id: Option<String>,
    pub shiprocket_order_id: Option<String>,
    pub status: Option<String>,
    pub charge: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    /// Human-readable identifier, e.g. `CC-20260714093055-X4QZ`.
    pub order_id: String,
    pub user_id: Uuid,
    pub items: Json<Vec<OrderItem>>,
    pub address: Json<Address>,
    pub coupon: Option<Json<CouponSnapshot>>,
    pub r#box: Option<Json<ShippingBox>>,
    /// Post-discount, pre-tax amount.
    pub amount: f64,
    pub gst_tax: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub delivery_charge: f64,
    pub total_amount: f64,
    pub payment_method: String,
    pub payment_status: String,
    pub status: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub payment_history: Json<Vec<PaymentHistoryEntry>>,
    pub brownie_points_used: f64,
    pub brownie_discount: f64,
    pub delivery: Option<Json<Delivery>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn item_count(&self) -> i32 {
        self.items.0.iter().map(|i| i.quantity as i32).sum()
    }

    /// Total parcel weight in kg: per-variant weight (grams, textual) times
    /// quantity, plus the empty box. Unparseable weights count as zero.
    pub fn parcel_weight_kg(&self) -> f64 {
        let grams: f64 = self
            .items
            .0
            .iter()
            .map(|i| parse_weight_grams(&i.variant.weight) * i.quantity as f64)
            .sum();
        let box_kg = self.r#box.as_ref().map(|b| b.0.box_weight_kg).unwrap_or(0.0);
        grams / 1000.0 + box_kg
    }
}

pub fn parse_weight_grams(weight: &str) -> f64 {
    let digits: String = weight.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
    digits.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_parsing() {
        assert_eq!(parse_weight_grams("500g"), 500.0);
        assert_eq!(parse_weight_grams("250"), 250.0);
        assert_eq!(parse_weight_grams("1.5"), 1.5);
        assert_eq!(parse_weight_grams("about a pound"), 0.0);
    }
}
