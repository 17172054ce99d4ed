use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Pending registration awaiting OTP verification. Upserted on resend and
/// removed wholesale once the account is created.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
