// src/state.rs
use std::sync::Arc;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::media::MediaManager;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub media: Arc<dyn MediaManager>,
}

impl AppState {
    pub fn new(db_pool: PgPool, config: AppConfig, media: Arc<dyn MediaManager>) -> Self {
        Self {
            db_pool,
            config: Arc::new(config),
            media,
        }
    }
}
