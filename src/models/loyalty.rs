use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const ENTRY_EARNED: &str = "earned";
pub const ENTRY_SPENT: &str = "spent";

/// Append-only loyalty ledger entry. `earned` rows reference the reel that
/// was watched, `spent` rows the order the points paid for.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BrowniePointEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_type: String,
    pub points: f64,
    pub reel_id: Option<Uuid>,
    pub order_ref: Option<Uuid>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
