//! Thin clients for the external SaaS providers: payment gateway, courier
//! aggregators, object storage, transactional email, and PDF rendering.
//! Each method wraps exactly one outbound HTTP call.

pub mod borzo;
pub mod mailer;
pub mod razorpay;
pub mod renderer;
pub mod shiprocket;
pub mod storage;

use serde::Serialize;

/// Normalized rate quote from whichever courier aggregator served it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierQuote {
    pub courier_name: String,
    pub rate: f64,
}
