//! Persistence models. One row type per resource; document-shaped
//! sub-records live in JSONB columns behind `sqlx::types::Json`.

pub mod address;
pub mod banner;
pub mod cart;
pub mod coupon;
pub mod event;
pub mod loyalty;
pub mod order;
pub mod otp;
pub mod product;
pub mod reel;
pub mod review;
pub mod shipping_box;
pub mod store;
pub mod user;

use serde::{Deserialize, Serialize};

/// Descriptor for a blob held in object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub url: String,
    pub filename: String,
    pub content_type: String,
}

/// Lowercased, hyphen-separated slug of a display name.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Mango  Kulfi!"), "mango-kulfi");
        assert_eq!(slugify("  Salted -- Caramel  "), "salted-caramel");
    }
}
