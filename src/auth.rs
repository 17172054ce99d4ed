//! Bearer-JWT authentication: token issue/verify, password hashing, and the
//! request extractors that resolve a token's subject to a live user row.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::state::AppState;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(config: &Config, user_id: Uuid, role: &str) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims { sub: user_id, role: role.to_string(), iat: now, exp: now + config.jwt_ttl_secs };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(config.jwt_secret.as_bytes()))
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

pub fn decode_token(config: &Config, token: &str) -> Result<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(config.jwt_secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token expired. Please log in again.".into())
            }
            _ => AppError::Unauthorized("Invalid token. Please log in again.".into()),
        })
}

pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(AppError::Validation("Password cannot be empty".into()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("stored hash invalid: {e}")))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn bearer_token(parts: &Parts) -> Result<String> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Not authorized, token missing".into()))?;
    header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthorized("Not authorized, token missing".into()))
}

async fn resolve_user(state: &AppState, parts: &Parts) -> Result<User> {
    let claims = decode_token(&state.config, &bearer_token(parts)?)?;
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(claims.sub)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(user)
}

/// Authenticated customer, re-resolved from the database on every request.
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        Ok(Self(resolve_user(state, parts).await?))
    }
}

/// Authenticated admin; same resolution plus a role check.
pub struct AuthAdmin(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = resolve_user(state, parts).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Forbidden("You do not have permission to perform this action".into()));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        std::env::set_var("DATABASE_URL", "postgres://localhost/test");
        std::env::set_var("JWT_SECRET", "test-secret");
        std::env::set_var("RAZORPAY_KEY_ID", "rzp_test");
        std::env::set_var("RAZORPAY_KEY_SECRET", "rzp_secret");
        Config::from_env().unwrap()
    }

    #[test]
    fn token_roundtrip() {
        let config = test_config();
        let id = Uuid::new_v4();
        let token = issue_token(&config, id, ROLE_USER).unwrap();
        let claims = decode_token(&config, &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, ROLE_USER);
    }

    #[test]
    fn tampered_token_rejected() {
        let config = test_config();
        let token = issue_token(&config, Uuid::new_v4(), ROLE_USER).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(decode_token(&config, &tampered).is_err());
    }

    #[test]
    fn password_hash_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password(&hash, "hunter2").unwrap());
        assert!(!verify_password(&hash, "hunter3").unwrap());
    }
}
