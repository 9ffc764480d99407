// src/dtos/category.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::category::{Category, CategoryWithCount};
use crate::slug::{is_valid_slug, slugify};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    pub keyword: Option<String>,
    pub show_on_menu: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryEditModel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url_slug: Option<String>,
    #[serde(default)]
    pub show_on_menu: bool,
}

impl CategoryEditModel {
    pub fn validate(&self) -> Result<String, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Category name is required"));
        }
        if self.name.chars().count() > 128 {
            return Err(AppError::validation("Category name must be at most 128 characters"));
        }
        let slug = match self.url_slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slugify(&self.name),
        };
        if !is_valid_slug(&slug) || slug.len() > 128 {
            return Err(AppError::validation(format!("Invalid url slug '{slug}'")));
        }
        Ok(slug)
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub url_slug: String,
    pub show_on_menu: bool,
}

impl From<Category> for CategoryDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            url_slug: c.url_slug,
            show_on_menu: c.show_on_menu,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryItem {
    #[serde(flatten)]
    pub category: CategoryDto,
    pub product_count: i64,
}

impl From<CategoryWithCount> for CategoryItem {
    fn from(row: CategoryWithCount) -> Self {
        Self {
            category: CategoryDto::from(row.category),
            product_count: row.product_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_derived_from_name() {
        let m = CategoryEditModel {
            name: "Light novel".into(),
            description: String::new(),
            url_slug: None,
            show_on_menu: true,
        };
        assert_eq!(m.validate().unwrap(), "light-novel");
    }

    #[test]
    fn blank_name_is_rejected() {
        let m = CategoryEditModel {
            name: " ".into(),
            description: String::new(),
            url_slug: Some("x".into()),
            show_on_menu: false,
        };
        assert!(m.validate().is_err());
    }

    #[test]
    fn item_serializes_flat() {
        let item = CategoryItem {
            category: CategoryDto {
                id: Uuid::nil(),
                name: "Manga".into(),
                description: "Manga".into(),
                url_slug: "manga".into(),
                show_on_menu: true,
            },
            product_count: 12,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["url_slug"], "manga");
        assert_eq!(v["product_count"], 12);
    }
}
