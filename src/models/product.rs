// src/models/product.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub short_intro: String,
    pub description: String,
    pub url_slug: String,
    pub price: Decimal,
    pub quantity: i32,
    /// Advertised percentage in [0, 1]. Order pricing ignores it.
    pub discount: Decimal,
    pub active: bool,
    pub create_date: DateTime<Utc>,
    pub update_date: Option<DateTime<Utc>>,
}

/// Product joined with the category columns the API always shows.
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithCategory {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: String,
    pub category_slug: String,
}
