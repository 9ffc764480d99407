// src/models/picture.rs
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Picture {
    pub id: Uuid,
    pub product_id: Uuid,
    pub path: String,
    pub active: bool,
}
