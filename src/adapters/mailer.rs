//! Transactional email via a Brevo-style JSON send API.

use std::sync::Arc;

use serde_json::json;

use crate::config::Config;
use crate::error::{AppError, Result};

const SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl Mailer {
    pub fn new(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    pub async fn send(&self, to_email: &str, to_name: &str, subject: &str, html: &str) -> Result<()> {
        let response = self
            .http
            .post(SEND_URL)
            .header("api-key", &self.config.mail_api_key)
            .json(&json!({
                "sender": { "name": self.config.mail_sender_name, "email": self.config.mail_sender_email },
                "to": [{ "email": to_email, "name": to_name }],
                "subject": subject,
                "htmlContent": html,
            }))
            .send()
            .await
            .map_err(|e| AppError::Mail(format!("send request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Mail(format!("send returned {}", response.status())));
        }
        Ok(())
    }
}
