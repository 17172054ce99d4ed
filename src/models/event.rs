use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::Media;

pub const EVENT_LIVE: &str = "live";
pub const EVENT_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub map_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContact {
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub profile_picture: Option<Media>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub tags: Vec<String>,
    pub event_date: DateTime<Utc>,
    pub from_time: String,
    pub total_hours: String,
    pub age_limit: String,
    pub languages: Vec<String>,
    pub prohibited_items: Vec<String>,
    pub location: Json<EventLocation>,
    pub contact_details: Option<Json<EventContact>>,
    pub price: f64,
    pub images: Json<Vec<Media>>,
    pub max_capacity: i32,
    pub status: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
