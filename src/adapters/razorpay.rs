//! Razorpay order creation and payment-signature validation.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;

use crate::config::Config;
use crate::error::{AppError, Result};

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Clone)]
pub struct Razorpay {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl Razorpay {
    pub fn new(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    /// Creates a gateway order for `amount_minor` paise with the given
    /// receipt (our human-readable order id).
    pub async fn create_order(&self, amount_minor: u64, receipt: &str) -> Result<GatewayOrder> {
        let response = self
            .http
            .post(ORDERS_URL)
            .basic_auth(&self.config.razorpay_key_id, Some(&self.config.razorpay_key_secret))
            .json(&json!({ "amount": amount_minor, "currency": "INR", "receipt": receipt }))
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("order create request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Gateway(format!("order create returned {}", response.status())));
        }
        response.json().await.map_err(|e| AppError::Gateway(format!("order create response invalid: {e}")))
    }

    pub fn validate_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        validate_signature(&self.config.razorpay_key_secret, order_id, payment_id, signature)
    }
}

/// Checks `signature` against HMAC-SHA256(secret, "order_id|payment_id").
/// Verification goes through the mac itself, so the comparison is
/// constant-time.
pub fn validate_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_genuine_signature() {
        let sig = sign("secret", "order_abc", "pay_xyz");
        assert!(validate_signature("secret", "order_abc", "pay_xyz", &sig));
    }

    #[test]
    fn rejects_tampered_signature() {
        let mut sig = sign("secret", "order_abc", "pay_xyz");
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!validate_signature("secret", "order_abc", "pay_xyz", &sig));
    }

    #[test]
    fn rejects_wrong_secret_and_garbage() {
        let sig = sign("secret", "order_abc", "pay_xyz");
        assert!(!validate_signature("other", "order_abc", "pay_xyz", &sig));
        assert!(!validate_signature("secret", "order_abc", "pay_xyz", "not-hex"));
    }
}
