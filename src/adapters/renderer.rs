//! HTML-to-PDF conversion through an external rendering service.

use std::sync::Arc;

use serde_json::json;

use crate::config::Config;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct Renderer {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl Renderer {
    pub fn new(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    pub async fn html_to_pdf(&self, html: &str) -> Result<Vec<u8>> {
        if self.config.renderer_url.is_empty() {
            return Err(AppError::Render("renderer not configured".into()));
        }
        let response = self
            .http
            .post(&self.config.renderer_url)
            .json(&json!({ "html": html, "format": "A4", "printBackground": true }))
            .send()
            .await
            .map_err(|e| AppError::Render(format!("render request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Render(format!("render returned {}", response.status())));
        }
        let bytes = response.bytes().await.map_err(|e| AppError::Render(format!("render body unreadable: {e}")))?;
        Ok(bytes.to_vec())
    }
}
