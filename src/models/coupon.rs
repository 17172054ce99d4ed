use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DISCOUNT_PERCENTAGE: &str = "percentage";
pub const DISCOUNT_FLAT: &str = "flat";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub slug: String,
    pub discount_type: String,
    pub discount_value: f64,
    pub min_purchase_amount: f64,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Append-only redemption list; checked for single-use-per-user.
    pub used_by: Vec<Uuid>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && self.expires_at > now
    }

    pub fn used_by_user(&self, user_id: Uuid) -> bool {
        self.used_by.contains(&user_id)
    }

    pub fn discount_for(&self, subtotal: f64) -> f64 {
        if self.discount_type == DISCOUNT_PERCENTAGE {
            subtotal * self.discount_value / 100.0
        } else {
            self.discount_value
        }
    }
}

/// Snapshot stored on the order at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponSnapshot {
    pub id: Uuid,
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
    pub discount_amount: f64,
    pub min_purchase_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(discount_type: &str, value: f64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4(),
            code: "SAVE10".into(),
            slug: "save10".into(),
            discount_type: discount_type.into(),
            discount_value: value,
            min_purchase_amount: 500.0,
            starts_at: now - Duration::days(1),
            expires_at: now + Duration::days(1),
            used_by: vec![],
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn percentage_discount() {
        assert_eq!(coupon(DISCOUNT_PERCENTAGE, 10.0).discount_for(1000.0), 100.0);
    }

    #[test]
    fn flat_discount_ignores_subtotal() {
        assert_eq!(coupon(DISCOUNT_FLAT, 75.0).discount_for(1000.0), 75.0);
    }

    #[test]
    fn validity_window() {
        let c = coupon(DISCOUNT_PERCENTAGE, 10.0);
        assert!(c.in_window(Utc::now()));
        assert!(!c.in_window(Utc::now() + Duration::days(2)));
        assert!(!c.in_window(Utc::now() - Duration::days(2)));
    }

    #[test]
    fn single_use_tracking() {
        let user = Uuid::new_v4();
        let mut c = coupon(DISCOUNT_PERCENTAGE, 10.0);
        assert!(!c.used_by_user(user));
        c.used_by.push(user);
        assert!(c.used_by_user(user));
    }
}
