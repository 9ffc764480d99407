// src/models/order.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Processing,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::New,
        OrderStatus::Processing,
        OrderStatus::Shipping,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (New, Processing) | (New, Cancelled) | (Processing, Shipping) | (Processing, Cancelled) | (Shipping, Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown order status '{s}'"))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub discount_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub ship_address: String,
    pub ship_tel: String,
    pub note: String,
    pub order_date: DateTime<Utc>,
    /// Stored lowercase; see [`OrderStatus::as_str`].
    pub status: String,
}

/// Order row with the discount columns resolved through the optional FK.
#[derive(Debug, Clone, FromRow)]
pub struct OrderWithDiscount {
    #[sqlx(flatten)]
    pub order: Order,
    pub discount_code: Option<String>,
    pub discount_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderDetail {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price captured at checkout.
    pub price: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderDetailWithProduct {
    #[sqlx(flatten)]
    pub detail: OrderDetail,
    pub product_name: String,
    pub product_slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_column_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert_eq!("Shipping".parse::<OrderStatus>(), Ok(OrderStatus::Shipping));
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipping));
        assert!(OrderStatus::Shipping.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn terminal_and_backward_transitions_are_rejected() {
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::New));
        assert!(!OrderStatus::Shipping.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipping.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::New.can_transition_to(OrderStatus::New));
    }
}
