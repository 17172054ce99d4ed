//! Shiprocket courier aggregator: token-cached login, hyperlocal
//! serviceability quotes, adhoc order creation and AWB assignment.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::CourierQuote;
use crate::config::Config;
use crate::error::{AppError, Result};

const BASE_URL: &str = "https://apiv2.shiprocket.in/v1/external";
// Tokens are valid for ten days.
const TOKEN_TTL: Duration = Duration::from_secs(10 * 24 * 60 * 60);

struct CachedToken {
    value: String,
    fetched_at: Instant,
}

#[derive(Clone)]
pub struct Shiprocket {
    http: reqwest::Client,
    config: Arc<Config>,
    token: Arc<Mutex<Option<CachedToken>>>,
}

#[derive(Debug, Serialize)]
pub struct ShipmentItem {
    pub name: String,
    pub sku: String,
    pub units: u32,
    pub selling_price: f64,
}

#[derive(Debug, Serialize)]
pub struct ShipmentRequest {
    pub order_id: String,
    pub order_date: String,
    pub pickup_location: String,
    pub billing_customer_name: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_pincode: String,
    pub billing_state: String,
    pub billing_country: String,
    pub billing_email: String,
    pub billing_phone: String,
    pub shipping_is_billing: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub order_items: Vec<ShipmentItem>,
    pub sub_total: f64,
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
pub struct ShipmentCreated {
    pub order_id: i64,
    pub shipment_id: i64,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ServiceabilityResponse {
    data: Option<ServiceabilityData>,
}

#[derive(Debug, Deserialize)]
struct ServiceabilityData {
    available_courier_companies: Vec<AvailableCourier>,
}

#[derive(Debug, Deserialize)]
struct AvailableCourier {
    courier_name: String,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct AwbResponse {
    response: Option<AwbResponseInner>,
}

#[derive(Debug, Deserialize)]
struct AwbResponseInner {
    data: Option<AwbData>,
}

#[derive(Debug, Deserialize)]
pub struct AwbData {
    pub awb_code: String,
    pub courier_name: String,
}

impl Shiprocket {
    pub fn new(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config, token: Arc::new(Mutex::new(None)) }
    }

    async fn token(&self) -> Result<String> {
        if let Some(cached) = self.token.lock().unwrap().as_ref() {
            if cached.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(cached.value.clone());
            }
        }
        let response = self
            .http
            .post(format!("{BASE_URL}/auth/login"))
            .json(&json!({ "email": self.config.shiprocket_email, "password": self.config.shiprocket_password }))
            .send()
            .await
            .map_err(|e| AppError::Courier(format!("login request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Courier(format!("login returned {}", response.status())));
        }
        let login: LoginResponse =
            response.json().await.map_err(|e| AppError::Courier(format!("login response invalid: {e}")))?;
        *self.token.lock().unwrap() = Some(CachedToken { value: login.token.clone(), fetched_at: Instant::now() });
        Ok(login.token)
    }

    /// Hyperlocal rate quote to the destination; returns the cheapest
    /// available courier or a 4xx-surfacing error when none serves the route.
    pub async fn serviceability(
        &self,
        delivery_pincode: &str,
        delivery_lat: f64,
        delivery_long: f64,
        weight_kg: f64,
    ) -> Result<CourierQuote> {
        let token = self.token().await?;
        let response = self
            .http
            .get(format!("{BASE_URL}/courier/serviceability"))
            .bearer_auth(&token)
            .query(&[
                ("pickup_postcode", self.config.shiprocket_pickup_pincode.as_str()),
                ("delivery_postcode", delivery_pincode),
                ("weight", &weight_kg.to_string()),
                ("cod", "0"),
                ("is_new_hyperlocal", "1"),
                ("lat_from", &self.config.shiprocket_pickup_lat.to_string()),
                ("long_from", &self.config.shiprocket_pickup_long.to_string()),
                ("lat_to", &delivery_lat.to_string()),
                ("long_to", &delivery_long.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Courier(format!("serviceability request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Courier(format!("serviceability returned {}", response.status())));
        }
        let body: ServiceabilityResponse =
            response.json().await.map_err(|e| AppError::Courier(format!("serviceability response invalid: {e}")))?;
        body.data
            .map(|d| d.available_courier_companies)
            .unwrap_or_default()
            .into_iter()
            .min_by(|a, b| a.rate.total_cmp(&b.rate))
            .map(|c| CourierQuote { courier_name: c.courier_name, rate: c.rate })
            .ok_or_else(|| AppError::Validation("No courier available for this address".into()))
    }

    pub async fn create_order(&self, request: &ShipmentRequest) -> Result<ShipmentCreated> {
        let token = self.token().await?;
        let response = self
            .http
            .post(format!("{BASE_URL}/orders/create/adhoc"))
            .bearer_auth(&token)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Courier(format!("order create request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Courier(format!("order create returned {}", response.status())));
        }
        response.json().await.map_err(|e| AppError::Courier(format!("order create response invalid: {e}")))
    }

    pub async fn assign_awb(&self, shipment_id: i64) -> Result<AwbData> {
        let token = self.token().await?;
        let response = self
            .http
            .post(format!("{BASE_URL}/courier/assign/awb"))
            .bearer_auth(&token)
            .json(&json!({ "shipment_id": shipment_id }))
            .send()
            .await
            .map_err(|e| AppError::Courier(format!("awb assign request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Courier(format!("awb assign returned {}", response.status())));
        }
        let body: AwbResponse =
            response.json().await.map_err(|e| AppError::Courier(format!("awb assign response invalid: {e}")))?;
        body.response
            .and_then(|r| r.data)
            .ok_or_else(|| AppError::Courier("awb assign response missing data".into()))
    }
}
