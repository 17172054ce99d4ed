//! Object storage: PUT/DELETE against an S3-style endpoint, returning
//! public URLs for the stored blobs.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Media;

/// An incoming multipart file, decoded by the HTTP layer and uploaded here.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

#[derive(Clone)]
pub struct Storage {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl Storage {
    pub fn new(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.config.storage_endpoint, self.config.storage_bucket, key)
    }

    /// Uploads a blob under `folder/` with a collision-proof key and returns
    /// its descriptor.
    pub async fn put(&self, bytes: Vec<u8>, filename: &str, content_type: &str, folder: &str) -> Result<Media> {
        let safe_name: String =
            filename.chars().map(|c| if c.is_alphanumeric() || c == '.' || c == '-' { c } else { '_' }).collect();
        let key = format!("{folder}/{}-{safe_name}", Uuid::new_v4());
        let url = self.object_url(&key);
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.config.storage_api_key)
            .header("Content-Type", content_type.to_string())
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Storage(format!("upload returned {}", response.status())));
        }
        Ok(Media { url, filename: key, content_type: content_type.to_string() })
    }

    pub async fn put_file(&self, file: UploadedFile, folder: &str) -> Result<Media> {
        self.put(file.bytes, &file.filename, &file.content_type, folder).await
    }

    /// Removes a superseded blob. Callers treat failures as non-fatal; the
    /// worst case is an orphaned object.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.object_url(key))
            .bearer_auth(&self.config.storage_api_key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("delete request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Storage(format!("delete returned {}", response.status())));
        }
        Ok(())
    }
}
