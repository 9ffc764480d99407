// src/models/discount.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Discount {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    /// Fraction in [0, 1]; 0.5 means half price.
    pub discount_percentage: Decimal,
    pub expiry_date: DateTime<Utc>,
    pub min_price: Decimal,
    /// Remaining number of orders that may use the code.
    pub quantity: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscountRejection {
    #[error("Discount code is not active")]
    Inactive,
    #[error("Discount code has expired")]
    Expired,
    #[error("Discount code has been used up")]
    Exhausted,
    #[error("Order subtotal {subtotal:.2} is below the discount minimum of {min_price:.2}")]
    BelowMinimum { min_price: Decimal, subtotal: Decimal },
}

impl Discount {
    /// Checkout-time gate. Total computation never calls this.
    pub fn check_applicable(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<(), DiscountRejection> {
        if !self.active {
            return Err(DiscountRejection::Inactive);
        }
        if self.expiry_date <= now {
            return Err(DiscountRejection::Expired);
        }
        if self.quantity <= 0 {
            return Err(DiscountRejection::Exhausted);
        }
        if subtotal < self.min_price {
            return Err(DiscountRejection::BelowMinimum {
                min_price: self.min_price,
                subtotal,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn discount(now: DateTime<Utc>) -> Discount {
        Discount {
            id: Uuid::new_v4(),
            name: "Spring sale".into(),
            code: "100000001".into(),
            discount_percentage: dec!(0.5),
            expiry_date: now + Duration::days(60),
            min_price: dec!(100),
            quantity: 3,
            active: true,
        }
    }

    #[test]
    fn valid_code_passes() {
        let now = Utc::now();
        assert_eq!(discount(now).check_applicable(dec!(100), now), Ok(()));
    }

    #[test]
    fn inactive_code_is_rejected_first() {
        let now = Utc::now();
        let mut d = discount(now);
        d.active = false;
        d.quantity = 0;
        assert_eq!(d.check_applicable(dec!(500), now), Err(DiscountRejection::Inactive));
    }

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let mut d = discount(now);
        d.expiry_date = now;
        assert_eq!(d.check_applicable(dec!(500), now), Err(DiscountRejection::Expired));
    }

    #[test]
    fn exhausted_code_is_rejected() {
        let now = Utc::now();
        let mut d = discount(now);
        d.quantity = 0;
        assert_eq!(d.check_applicable(dec!(500), now), Err(DiscountRejection::Exhausted));
    }

    #[test]
    fn subtotal_below_minimum_is_rejected() {
        let now = Utc::now();
        let err = discount(now).check_applicable(dec!(99.99), now).unwrap_err();
        assert!(matches!(err, DiscountRejection::BelowMinimum { .. }));
        assert!(err.to_string().contains("100.00"));
    }
}
