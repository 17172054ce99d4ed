//! Borzo hyperlocal courier: static-token client for rate calculation and
//! order management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::CourierQuote;
use crate::config::Config;
use crate::error::{AppError, Result};

const BASE_URL: &str = "https://robotapitest-in.borzodelivery.com/api/business/1.6";

#[derive(Clone)]
pub struct Borzo {
    http: reqwest::Client,
    config: Arc<Config>,
}

#[derive(Debug, Serialize)]
pub struct BorzoPoint {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_person: BorzoContact,
}

#[derive(Debug, Serialize)]
pub struct BorzoContact {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct BorzoOrderRequest {
    pub matter: String,
    pub total_weight_kg: f64,
    pub points: Vec<BorzoPoint>,
}

#[derive(Debug, Deserialize)]
struct BorzoEnvelope {
    is_successful: bool,
    order: Option<BorzoOrder>,
}

#[derive(Debug, Deserialize)]
pub struct BorzoOrder {
    pub order_id: i64,
    pub status: String,
    pub payment_amount: String,
}

impl Borzo {
    pub fn new(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<BorzoEnvelope> {
        let response = self
            .http
            .post(format!("{BASE_URL}{path}"))
            .header("Authorization", format!("Token {}", self.config.borzo_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Courier(format!("borzo request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Courier(format!("borzo returned {}", response.status())));
        }
        response.json().await.map_err(|e| AppError::Courier(format!("borzo response invalid: {e}")))
    }

    /// Rate quote: Borzo prices the whole route, so the quote is the
    /// order-calculation payment amount.
    pub async fn calculate_order(&self, request: &BorzoOrderRequest) -> Result<CourierQuote> {
        let body = serde_json::to_value(request)
            .map_err(|e| AppError::Internal(format!("borzo payload serialization failed: {e}")))?;
        let envelope = self.post("/calculate-order", body).await?;
        let order = envelope
            .order
            .filter(|_| envelope.is_successful)
            .ok_or_else(|| AppError::Validation("No courier available for this address".into()))?;
        let rate = order
            .payment_amount
            .parse::<f64>()
            .map_err(|e| AppError::Courier(format!("borzo payment amount invalid: {e}")))?;
        Ok(CourierQuote { courier_name: "Borzo".into(), rate })
    }

    pub async fn create_order(&self, request: &BorzoOrderRequest) -> Result<BorzoOrder> {
        let body = serde_json::to_value(request)
            .map_err(|e| AppError::Internal(format!("borzo payload serialization failed: {e}")))?;
        let envelope = self.post("/create-order", body).await?;
        envelope
            .order
            .filter(|_| envelope.is_successful)
            .ok_or_else(|| AppError::Courier("borzo order creation was not successful".into()))
    }

    pub async fn cancel_order(&self, order_id: i64) -> Result<BorzoOrder> {
        let envelope = self.post("/cancel-order", json!({ "order_id": order_id })).await?;
        envelope
            .order
            .filter(|_| envelope.is_successful)
            .ok_or_else(|| AppError::Courier("borzo order cancel was not successful".into()))
    }
}
