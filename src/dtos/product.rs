// src/dtos/product.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::feedback::{Feedback, MAX_CONTENT_LEN, MAX_RATE};
use crate::models::picture::Picture;
use crate::models::product::ProductWithCategory;
use crate::pricing::round_money;
use crate::slug::{is_valid_slug, slugify};

/// Catalog filters; every field is optional and only applied when set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub keyword: Option<String>,
    pub category_slug: Option<String>,
    pub product_slug: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub active: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductEditModel {
    pub category_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub short_intro: String,
    #[serde(default)]
    pub description: String,
    /// Derived from `name` when omitted.
    pub url_slug: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub active: bool,
}

impl ProductEditModel {
    /// Checks field ranges and returns the slug to store.
    pub fn validate(&self) -> Result<String, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Product name is required"));
        }
        if self.name.chars().count() > 256 {
            return Err(AppError::validation("Product name must be at most 256 characters"));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::validation("Price cannot be negative"));
        }
        if self.price.normalize().scale() > 2 {
            return Err(AppError::validation("Price must have at most 2 decimal places"));
        }
        if self.quantity < 0 {
            return Err(AppError::validation("Quantity cannot be negative"));
        }
        if !(Decimal::ZERO..=Decimal::ONE).contains(&self.discount) {
            return Err(AppError::validation("Discount must be between 0 and 1"));
        }

        let slug = match self.url_slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slugify(&self.name),
        };
        if !is_valid_slug(&slug) {
            return Err(AppError::validation(format!("Invalid url slug '{slug}'")));
        }
        Ok(slug)
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub url_slug: String,
}

#[derive(Debug, Serialize)]
pub struct PictureDto {
    pub id: Uuid,
    pub path: String,
    pub active: bool,
}

impl From<Picture> for PictureDto {
    fn from(p: Picture) -> Self {
        Self { id: p.id, path: p.path, active: p.active }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub short_intro: String,
    pub url_slug: String,
    pub price: Decimal,
    pub discount: Decimal,
    /// Advertised price after the product's own discount.
    pub sale_price: Decimal,
    pub quantity: i32,
    pub active: bool,
    pub create_date: DateTime<Utc>,
    pub category: CategoryRef,
    pub pictures: Vec<PictureDto>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductDto,
    pub description: String,
    pub update_date: Option<DateTime<Utc>>,
}

impl ProductDto {
    pub fn from_parts(row: ProductWithCategory, pictures: Vec<Picture>) -> Self {
        let p = row.product;
        Self {
            id: p.id,
            sale_price: round_money(p.price * (Decimal::ONE - p.discount)),
            name: p.name,
            short_intro: p.short_intro,
            url_slug: p.url_slug,
            price: p.price,
            discount: p.discount,
            quantity: p.quantity,
            active: p.active,
            create_date: p.create_date,
            category: CategoryRef {
                id: p.category_id,
                name: row.category_name,
                url_slug: row.category_slug,
            },
            pictures: pictures.into_iter().map(PictureDto::from).collect(),
        }
    }
}

impl ProductDetail {
    pub fn from_parts(row: ProductWithCategory, pictures: Vec<Picture>) -> Self {
        let description = row.product.description.clone();
        let update_date = row.product.update_date;
        Self {
            summary: ProductDto::from_parts(row, pictures),
            description,
            update_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedbackEditModel {
    #[serde(default)]
    pub content: String,
    pub rate: i32,
}

impl FeedbackEditModel {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(0..=MAX_RATE).contains(&self.rate) {
            return Err(AppError::validation(format!("Rate must be between 0 and {MAX_RATE}")));
        }
        if self.content.chars().count() > MAX_CONTENT_LEN {
            return Err(AppError::validation(format!("Content must be at most {MAX_CONTENT_LEN} characters")));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackDto {
    pub id: Uuid,
    pub user_name: String,
    pub content: String,
    pub rate: i32,
    pub post_date: DateTime<Utc>,
}

impl From<Feedback> for FeedbackDto {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            user_name: f.user_name,
            content: f.content,
            rate: f.rate,
            post_date: f.post_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::Product;
    use rust_decimal_macros::dec;

    fn edit_model() -> ProductEditModel {
        ProductEditModel {
            category_id: Uuid::new_v4(),
            name: "Mừng cậu trở về".into(),
            short_intro: String::new(),
            description: String::new(),
            url_slug: None,
            price: dec!(100000),
            quantity: 10,
            discount: dec!(0.1),
            active: true,
        }
    }

    #[test]
    fn slug_defaults_to_slugified_name() {
        assert_eq!(edit_model().validate().unwrap(), "mung-cau-tro-ve");
    }

    #[test]
    fn explicit_slug_is_kept_when_valid() {
        let mut m = edit_model();
        m.url_slug = Some(" welcome-back ".into());
        assert_eq!(m.validate().unwrap(), "welcome-back");

        m.url_slug = Some("Not A Slug".into());
        assert!(m.validate().is_err());
    }

    #[test]
    fn ranges_are_checked() {
        let mut m = edit_model();
        m.price = dec!(-1);
        assert!(m.validate().is_err());

        let mut m = edit_model();
        m.price = dec!(10.005);
        assert!(m.validate().is_err());

        let mut m = edit_model();
        m.price = dec!(10.50);
        assert!(m.validate().is_ok());

        let mut m = edit_model();
        m.discount = dec!(1.5);
        assert!(m.validate().is_err());

        let mut m = edit_model();
        m.quantity = -3;
        assert!(m.validate().is_err());

        let mut m = edit_model();
        m.name = "   ".into();
        assert!(m.validate().is_err());
    }

    #[test]
    fn feedback_rate_bounds() {
        assert!(FeedbackEditModel { content: "ok".into(), rate: 0 }.validate().is_ok());
        assert!(FeedbackEditModel { content: "ok".into(), rate: 5 }.validate().is_ok());
        assert!(FeedbackEditModel { content: "ok".into(), rate: 6 }.validate().is_err());
        assert!(FeedbackEditModel { content: "x".repeat(501), rate: 3 }.validate().is_err());
    }

    #[test]
    fn dto_flattens_category_and_sale_price() {
        let category_id = Uuid::new_v4();
        let row = ProductWithCategory {
            product: Product {
                id: Uuid::new_v4(),
                category_id,
                name: "Book".into(),
                short_intro: "intro".into(),
                description: "long text".into(),
                url_slug: "book".into(),
                price: dec!(99.99),
                quantity: 4,
                discount: dec!(0.1),
                active: true,
                create_date: Utc::now(),
                update_date: None,
            },
            category_name: "Manga".into(),
            category_slug: "manga".into(),
        };
        let detail = ProductDetail::from_parts(row, vec![]);
        assert_eq!(detail.summary.sale_price, dec!(89.99));
        assert_eq!(detail.summary.category.id, category_id);
        assert_eq!(detail.description, "long text");

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["category"]["url_slug"], "manga");
        assert_eq!(json["description"], "long text");
        assert_eq!(json["name"], "Book");
        assert_eq!(json["sale_price"], 89.99);
    }
}
