use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::Media;

pub const REVIEW_PRODUCT: &str = "product";
pub const REVIEW_STORE: &str = "store";

/// Snapshot of the reviewed product or store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubject {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<Media>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub review_type: String,
    pub subject: Json<ReviewSubject>,
    pub review: String,
    pub rating: i32,
    pub approved: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
