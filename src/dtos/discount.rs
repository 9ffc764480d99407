// src/dtos/discount.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::discount::Discount;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscountQuery {
    pub keyword: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DiscountEditModel {
    pub name: String,
    pub code: String,
    pub discount_percentage: Decimal,
    pub expiry_date: DateTime<Utc>,
    #[serde(default)]
    pub min_price: Decimal,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub active: bool,
}

impl DiscountEditModel {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Discount name is required"));
        }
        let code = self.code.trim();
        if code.is_empty() || code.len() > 128 {
            return Err(AppError::validation("Discount code must be 1 to 128 characters"));
        }
        if !(Decimal::ZERO..=Decimal::ONE).contains(&self.discount_percentage) {
            return Err(AppError::validation("Discount percentage must be between 0 and 1"));
        }
        if self.min_price < Decimal::ZERO {
            return Err(AppError::validation("Minimum price cannot be negative"));
        }
        if self.quantity < 0 {
            return Err(AppError::validation("Quantity cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct DiscountDto {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub discount_percentage: Decimal,
    pub expiry_date: DateTime<Utc>,
    pub min_price: Decimal,
    pub quantity: i32,
    pub active: bool,
    /// Active, unexpired and not used up, ignoring the minimum price.
    pub usable: bool,
}

impl From<Discount> for DiscountDto {
    fn from(d: Discount) -> Self {
        let usable = d.active && d.quantity > 0 && d.expiry_date > Utc::now();
        Self {
            id: d.id,
            name: d.name,
            code: d.code,
            discount_percentage: d.discount_percentage,
            expiry_date: d.expiry_date,
            min_price: d.min_price,
            quantity: d.quantity,
            active: d.active,
            usable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn model() -> DiscountEditModel {
        DiscountEditModel {
            name: "Launch".into(),
            code: "100000001".into(),
            discount_percentage: dec!(0.5),
            expiry_date: Utc::now() + Duration::days(60),
            min_price: Decimal::ZERO,
            quantity: 100,
            active: true,
        }
    }

    #[test]
    fn accepts_fractional_percentage() {
        assert!(model().validate().is_ok());
    }

    #[test]
    fn rejects_whole_number_percentage() {
        let mut m = model();
        m.discount_percentage = dec!(50);
        assert!(m.validate().is_err());
    }

    #[test]
    fn rejects_negative_limits() {
        let mut m = model();
        m.min_price = dec!(-1);
        assert!(m.validate().is_err());

        let mut m = model();
        m.quantity = -1;
        assert!(m.validate().is_err());
    }

    #[test]
    fn expired_discount_is_not_usable() {
        let d = Discount {
            id: Uuid::new_v4(),
            name: "Old".into(),
            code: "OLD".into(),
            discount_percentage: dec!(0.2),
            expiry_date: Utc::now() - Duration::days(1),
            min_price: Decimal::ZERO,
            quantity: 10,
            active: true,
        };
        assert!(!DiscountDto::from(d).usable);
    }
}
