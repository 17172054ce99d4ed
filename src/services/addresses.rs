//! Customer address book.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::address::Address;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(regex(path = "PHONE_RE", message = "Invalid phone number"))]
    pub phone: String,
    #[validate(length(min = 1, message = "House is required"))]
    pub house: String,
    #[validate(length(min = 1, message = "Area is required"))]
    pub area: String,
    #[serde(default)]
    pub landmark: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(regex(path = "PINCODE_RE", message = "Invalid pincode"))]
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address_type: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").unwrap());
static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());

pub struct AddressService {
    db: PgPool,
}

impl AddressService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, input: AddressInput) -> Result<Address> {
        input.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        let mut tx = self.db.begin().await?;
        if input.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE, updated_at = NOW() WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }
        let address = sqlx::query_as::<_, Address>(
            "INSERT INTO addresses (id, user_id, name, phone, house, area, landmark, city, state, pincode, \
             latitude, longitude, address_type, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(input.house.trim())
        .bind(input.area.trim())
        .bind(input.landmark.trim())
        .bind(input.city.trim())
        .bind(input.state.trim())
        .bind(&input.pincode)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.address_type.as_deref().unwrap_or("home"))
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(address)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, input: AddressInput) -> Result<Address> {
        input.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        let mut tx = self.db.begin().await?;
        if input.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE, updated_at = NOW() WHERE user_id = $1 AND id <> $2")
                .bind(user_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        let address = sqlx::query_as::<_, Address>(
            "UPDATE addresses SET name = $1, phone = $2, house = $3, area = $4, landmark = $5, city = $6, \
             state = $7, pincode = $8, latitude = $9, longitude = $10, address_type = $11, is_default = $12, \
             updated_at = NOW() WHERE id = $13 AND user_id = $14 RETURNING *",
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(input.house.trim())
        .bind(input.area.trim())
        .bind(input.landmark.trim())
        .bind(input.city.trim())
        .bind(input.state.trim())
        .bind(&input.pincode)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.address_type.as_deref().unwrap_or("home"))
        .bind(input.is_default)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".into()))?;
        tx.commit().await?;
        Ok(address)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Address>> {
        Ok(sqlx::query_as::<_, Address>(
            "SELECT * FROM addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Address not found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            name: "Asha".into(),
            phone: "9876543210".into(),
            house: "12B".into(),
            area: "Fort".into(),
            landmark: String::new(),
            city: "Kochi".into(),
            state: "Kerala".into(),
            pincode: "682001".into(),
            latitude: None,
            longitude: None,
            address_type: None,
            is_default: false,
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn rejects_bad_phone_and_pincode() {
        let mut bad = input();
        bad.phone = "1234567890".into();
        assert!(bad.validate().is_err());
        let mut bad = input();
        bad.pincode = "6820".into();
        assert!(bad.validate().is_err());
    }
}
