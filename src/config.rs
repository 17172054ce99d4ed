//! Environment-driven application configuration.

use std::env;

use crate::error::{AppError, Result};

/// Courier aggregator used for hyperlocal rate quotes. Shipment booking
/// always goes through Shiprocket (AWB assignment is a Shiprocket concept).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourierProvider {
    Shiprocket,
    Borzo,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,

    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,

    /// State the seller is GST-registered in; orders delivered inside it
    /// split the tax into CGST+SGST, everything else is IGST.
    pub seller_gst_state: String,

    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,

    pub shiprocket_email: String,
    pub shiprocket_password: String,
    pub shiprocket_pickup_location: String,
    pub shiprocket_pickup_pincode: String,
    pub shiprocket_pickup_lat: f64,
    pub shiprocket_pickup_long: f64,

    pub borzo_token: String,
    pub courier_provider: CourierProvider,

    pub storage_endpoint: String,
    pub storage_bucket: String,
    pub storage_api_key: String,

    pub mail_api_key: String,
    pub mail_sender_name: String,
    pub mail_sender_email: String,

    pub renderer_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let get = |name: &str| {
            env::var(name).map_err(|_| AppError::Config(format!("missing environment variable '{name}'")))
        };
        let get_or = |name: &str, default: &str| env::var(name).unwrap_or_else(|_| default.to_string());

        let port = get_or("PORT", "8080")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("invalid PORT: {e}")))?;
        let jwt_ttl_secs = get_or("JWT_TTL_SECS", "604800")
            .parse::<i64>()
            .map_err(|e| AppError::Config(format!("invalid JWT_TTL_SECS: {e}")))?;
        let shiprocket_pickup_lat = get_or("SHIPROCKET_PICKUP_LAT", "0")
            .parse::<f64>()
            .map_err(|e| AppError::Config(format!("invalid SHIPROCKET_PICKUP_LAT: {e}")))?;
        let shiprocket_pickup_long = get_or("SHIPROCKET_PICKUP_LONG", "0")
            .parse::<f64>()
            .map_err(|e| AppError::Config(format!("invalid SHIPROCKET_PICKUP_LONG: {e}")))?;
        let courier_provider = match get_or("COURIER_PROVIDER", "shiprocket").as_str() {
            "shiprocket" => CourierProvider::Shiprocket,
            "borzo" => CourierProvider::Borzo,
            other => return Err(AppError::Config(format!("unknown COURIER_PROVIDER '{other}'"))),
        };

        Ok(Self {
            host: get_or("HOST", "0.0.0.0"),
            port,
            database_url: get("DATABASE_URL")?,
            jwt_secret: get("JWT_SECRET")?,
            jwt_ttl_secs,
            seller_gst_state: get_or("SELLER_GST_STATE", "Kerala"),
            razorpay_key_id: get("RAZORPAY_KEY_ID")?,
            razorpay_key_secret: get("RAZORPAY_KEY_SECRET")?,
            shiprocket_email: get_or("SHIPROCKET_EMAIL", ""),
            shiprocket_password: get_or("SHIPROCKET_PASSWORD", ""),
            shiprocket_pickup_location: get_or("SHIPROCKET_PICKUP_LOCATION", "Primary"),
            shiprocket_pickup_pincode: get_or("SHIPROCKET_PICKUP_PINCODE", ""),
            shiprocket_pickup_lat,
            shiprocket_pickup_long,
            borzo_token: get_or("BORZO_TOKEN", ""),
            courier_provider,
            storage_endpoint: get_or("STORAGE_ENDPOINT", ""),
            storage_bucket: get_or("STORAGE_BUCKET", "coldcart"),
            storage_api_key: get_or("STORAGE_API_KEY", ""),
            mail_api_key: get_or("MAIL_API_KEY", ""),
            mail_sender_name: get_or("MAIL_SENDER_NAME", "Coldcart"),
            mail_sender_email: get_or("MAIL_SENDER_EMAIL", "noreply@coldcart.in"),
            renderer_url: get_or("RENDERER_URL", ""),
        })
    }
}
