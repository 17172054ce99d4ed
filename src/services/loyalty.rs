//! Brownie-point queries. The ledger is the authority: balances are always
//! aggregated from it, never read off the user counter.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::loyalty::BrowniePointEntry;
use crate::pagination::{PageQuery, Paginated};

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub earned: f64,
    pub spent: f64,
    pub available: f64,
}

pub struct LoyaltyService {
    db: PgPool,
}

impl LoyaltyService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<Balance> {
        Ok(sqlx::query_as::<_, Balance>(
            "SELECT COALESCE(SUM(points) FILTER (WHERE entry_type = 'earned'), 0) AS earned, \
                    COALESCE(SUM(points) FILTER (WHERE entry_type = 'spent'), 0) AS spent, \
                    COALESCE(SUM(CASE WHEN entry_type = 'earned' THEN points ELSE -points END), 0) AS available \
             FROM brownie_points WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?)
    }

    pub async fn history(&self, user_id: Uuid, page: PageQuery) -> Result<Paginated<BrowniePointEntry>> {
        let (current, limit, offset) = page.resolve();
        let entries = sqlx::query_as::<_, BrowniePointEntry>(
            "SELECT * FROM brownie_points WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brownie_points WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        Ok(Paginated::new(entries, current, limit, total))
    }
}
