use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer delivery address. Orders copy the whole row as a JSONB snapshot
/// at checkout, so this type doubles as that snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub house: String,
    pub area: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address_type: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    pub fn full_line(&self) -> String {
        let mut parts = vec![self.house.clone(), self.area.clone()];
        if !self.landmark.is_empty() {
            parts.push(self.landmark.clone());
        }
        parts.push(self.city.clone());
        parts.push(self.state.clone());
        parts.push(self.pincode.clone());
        parts.join(", ")
    }
}
