use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shipping-container catalog entry. Boxes are auto-selected at checkout by
/// the order's total item count, so ranges must not overlap across boxes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShippingBox {
    pub id: Uuid,
    pub label: String,
    pub length_cm: f64,
    pub breadth_cm: f64,
    pub height_cm: f64,
    pub box_weight_kg: f64,
    pub item_count_min: i32,
    pub item_count_max: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShippingBox {
    pub fn fits(&self, item_count: i32) -> bool {
        self.item_count_min <= item_count && item_count <= self.item_count_max
    }
}

/// Two inclusive ranges overlap when neither lies strictly beyond the other.
pub fn ranges_overlap(a_min: i32, a_max: i32, b_min: i32, b_max: i32) -> bool {
    a_min <= b_max && a_max >= b_min
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(min: i32, max: i32) -> ShippingBox {
        ShippingBox {
            id: Uuid::new_v4(),
            label: format!("{min}-{max}"),
            length_cm: 30.0,
            breadth_cm: 20.0,
            height_cm: 15.0,
            box_weight_kg: 0.25,
            item_count_min: min,
            item_count_max: max,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fits_is_inclusive() {
        let b = boxed(4, 9);
        assert!(b.fits(4));
        assert!(b.fits(7));
        assert!(b.fits(9));
        assert!(!b.fits(3));
        assert!(!b.fits(10));
    }

    #[test]
    fn overlap_detection() {
        assert!(ranges_overlap(1, 5, 5, 9));
        assert!(ranges_overlap(4, 9, 1, 5));
        assert!(ranges_overlap(2, 3, 1, 10));
        assert!(!ranges_overlap(1, 3, 4, 6));
        assert!(!ranges_overlap(7, 9, 1, 6));
    }

    #[test]
    fn seven_items_pick_a_unique_box() {
        let boxes = vec![boxed(1, 3), boxed(4, 9), boxed(10, 20)];
        let matches: Vec<_> = boxes.iter().filter(|b| b.fits(7)).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].label, "4-9");
    }
}
