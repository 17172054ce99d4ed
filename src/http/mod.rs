//! HTTP surface: route tables, handlers, and the multipart plumbing shared
//! by the media-bearing admin endpoints.

pub mod admin;
pub mod public;
pub mod user;

use std::collections::HashMap;

use axum::extract::{DefaultBodyLimit, Multipart};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::storage::UploadedFile;
use crate::error::{AppError, Result};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = public::routes().nest("/user", user::routes()).nest("/admin", admin::routes());
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "UP", "service": "coldcart" })) }))
        .nest("/api/v1", api)
        // Reel videos are the largest uploads.
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Uniform success envelope.
pub fn ok<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({ "success": true, "message": message, "data": data }))
}

/// Text fields and files from a multipart request, grouped by field name.
pub struct MultipartBody {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Vec<UploadedFile>>,
}

impl MultipartBody {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut fields = HashMap::new();
        let mut files: HashMap<String, Vec<UploadedFile>> = HashMap::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("invalid multipart file: {e}")))?;
                    files.entry(name).or_default().push(UploadedFile {
                        bytes: bytes.to_vec(),
                        filename,
                        content_type,
                    });
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("invalid multipart field: {e}")))?;
                    fields.insert(name, text);
                }
            }
        }
        Ok(Self { fields, files })
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AppError::Validation(format!("Missing field '{name}'")))
    }

    pub fn json_field<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        serde_json::from_str(self.text(name)?)
            .map_err(|e| AppError::Validation(format!("Invalid '{name}' payload: {e}")))
    }

    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Result<UploadedFile> {
        self.take_files(name)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Validation(format!("Missing file '{name}'")))
    }
}
