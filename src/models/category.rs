// src/models/category.rs
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub url_slug: String,
    pub show_on_menu: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryWithCount {
    #[sqlx(flatten)]
    pub category: Category,
    pub product_count: i64,
}
