//! Shared application state handed to every handler.

use std::sync::Arc;

use sqlx::PgPool;

use crate::adapters::borzo::Borzo;
use crate::adapters::mailer::Mailer;
use crate::adapters::razorpay::Razorpay;
use crate::adapters::renderer::Renderer;
use crate::adapters::shiprocket::Shiprocket;
use crate::adapters::storage::Storage;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub razorpay: Razorpay,
    pub shiprocket: Shiprocket,
    pub borzo: Borzo,
    pub storage: Storage,
    pub mailer: Mailer,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let config = Arc::new(config);
        let http = reqwest::Client::new();
        Self {
            razorpay: Razorpay::new(http.clone(), config.clone()),
            shiprocket: Shiprocket::new(http.clone(), config.clone()),
            borzo: Borzo::new(http.clone(), config.clone()),
            storage: Storage::new(http.clone(), config.clone()),
            mailer: Mailer::new(http.clone(), config.clone()),
            renderer: Renderer::new(http, config.clone()),
            db,
            config,
        }
    }
}
