// src/models/feedback.rs
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_RATE: i32 = 5;
pub const MAX_CONTENT_LEN: usize = 500;

#[derive(Debug, Clone, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_name: String,
    pub content: String,
    pub rate: i32,
    pub post_date: DateTime<Utc>,
}
