use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use uuid::Uuid;

use super::Media;

/// Promotional video. Watching one fully earns a single brownie point, once
/// per user per reel.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reel {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub video: Json<Media>,
    pub thumbnail: Json<Media>,
    pub likes: Vec<Uuid>,
    pub views: Vec<Uuid>,
    pub fully_watched: Vec<Uuid>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
