//! Accounts: login, OTP-based registration, and admin user management.

use chrono::{Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, ROLE_USER};
use crate::error::{AppError, Result};
use crate::models::otp::OtpRecord;
use crate::models::user::User;
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;

const OTP_TTL_MINUTES: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub struct AccountService {
    state: AppState,
}

impl AccountService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        if !auth::verify_password(&user.password_hash, password)? {
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
        let token = auth::issue_token(&self.state.config, user.id, &user.role)?;
        Ok(AuthResponse { token, user })
    }

    /// First registration step: stash the pending account behind a hashed
    /// 6-digit OTP and mail the code. Re-sending updates the pending record.
    /// Returns whether this was a resend.
    pub async fn send_registration_otp(&self, input: RegisterInput) -> Result<bool> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::Validation("Email is required".into()));
        }
        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.state.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let otp = generate_otp();
        let otp_hash = auth::hash_password(&otp)?;
        let password_hash = input.password.as_deref().map(auth::hash_password).transpose()?;
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        let record = sqlx::query_as::<_, OtpRecord>("SELECT * FROM otps WHERE email = $1 ORDER BY created_at DESC")
            .bind(&email)
            .fetch_optional(&self.state.db)
            .await?;
        let resend = record.is_some();
        match record {
            Some(existing) => {
                sqlx::query(
                    "UPDATE otps SET otp_hash = $1, expires_at = $2, name = COALESCE($3, name), \
                     phone = COALESCE($4, phone), password_hash = COALESCE($5, password_hash) WHERE id = $6",
                )
                .bind(&otp_hash)
                .bind(expires_at)
                .bind(input.name.as_deref())
                .bind(input.phone.as_deref())
                .bind(password_hash.as_deref())
                .bind(existing.id)
                .execute(&self.state.db)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO otps (id, email, name, phone, password_hash, otp_hash, expires_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(Uuid::new_v4())
                .bind(&email)
                .bind(input.name.as_deref())
                .bind(input.phone.as_deref())
                .bind(password_hash.as_deref())
                .bind(&otp_hash)
                .bind(expires_at)
                .execute(&self.state.db)
                .await?;
            }
        }

        let name = input.name.as_deref().unwrap_or("there");
        let subject = if resend { "Verify OTP (Resent)" } else { "Verify OTP" };
        self.state.mailer.send(&email, name, subject, &otp_mail_html(&otp)).await?;
        Ok(resend)
    }

    /// Second step: check the code, create the account, clean up and log the
    /// new user in.
    pub async fn verify_registration_otp(&self, email: &str, otp: &str) -> Result<AuthResponse> {
        let email = email.trim().to_lowercase();
        let record = sqlx::query_as::<_, OtpRecord>(
            "SELECT * FROM otps WHERE email = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(&email)
        .fetch_optional(&self.state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("OTP not found or expired".into()))?;
        if record.expires_at < Utc::now() {
            return Err(AppError::NotFound("OTP not found or expired".into()));
        }
        if !auth::verify_password(&record.otp_hash, otp)? {
            return Err(AppError::Validation("Invalid OTP".into()));
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, phone, password_hash, role, is_verified, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, TRUE) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(record.name.as_deref())
        .bind(&email)
        .bind(record.phone.as_deref())
        .bind(record.password_hash.as_deref().unwrap_or_default())
        .bind(ROLE_USER)
        .fetch_one(&self.state.db)
        .await?;
        sqlx::query("DELETE FROM otps WHERE email = $1").bind(&email).execute(&self.state.db).await?;

        let name = user.name.clone().unwrap_or_else(|| "there".into());
        if let Err(e) = self.state.mailer.send(&email, &name, "Welcome to Coldcart", &welcome_mail_html(&name)).await
        {
            tracing::warn!(error = %e, "welcome mail failed");
        }

        let token = auth::issue_token(&self.state.config, user.id, &user.role)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn list_users(&self, page: PageQuery, search: Option<&str>) -> Result<Paginated<User>> {
        let (current, limit, offset) = page.resolve();
        let pattern = search.map(|s| format!("%{}%", s.trim()));
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'user' AND ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 \
             OR phone ILIKE $1) ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.state.db)
        .await?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE role = 'user' AND ($1::text IS NULL OR name ILIKE $1 \
             OR email ILIKE $1 OR phone ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.state.db)
        .await?;
        Ok(Paginated::new(users, current, limit, total))
    }

    pub async fn toggle_user_status(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

fn generate_otp() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

fn otp_mail_html(otp: &str) -> String {
    format!(
        "<html><body><p>Your Coldcart verification code is:</p>\
         <h2 style=\"letter-spacing:4px\">{otp}</h2>\
         <p>The code expires in {OTP_TTL_MINUTES} minutes.</p></body></html>"
    )
}

fn welcome_mail_html(name: &str) -> String {
    format!(
        "<html><body><h2>Welcome to Coldcart, {name}!</h2>\
         <p>Your account is ready. Dessert is on the way.</p></body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
