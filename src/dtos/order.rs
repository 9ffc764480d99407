// src/dtos/order.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::dtos::is_valid_email;
use crate::error::AppError;
use crate::models::order::{OrderDetailWithProduct, OrderStatus, OrderWithDiscount};
use crate::pricing::{price_order, PricedLine};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub email: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub ship_address: String,
    pub ship_tel: String,
    #[serde(default)]
    pub note: String,
    pub discount_code: Option<String>,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.first_name.trim().is_empty() {
            return Err(AppError::validation("First name is required"));
        }
        if !is_valid_email(&self.email) {
            return Err(AppError::validation("A valid email is required"));
        }
        if self.ship_address.trim().is_empty() {
            return Err(AppError::validation("Shipping address is required"));
        }
        if self.ship_tel.trim().is_empty() {
            return Err(AppError::validation("Shipping phone is required"));
        }
        if self.items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            if item.quantity <= 0 {
                return Err(AppError::validation("Quantity must be greater than 0"));
            }
            if !seen.insert(item.product_id) {
                return Err(AppError::validation(format!(
                    "Product {} appears more than once",
                    item.product_id
                )));
            }
        }
        Ok(())
    }

    /// Trimmed discount code, `None` when absent or blank.
    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct OrderDiscountDto {
    pub code: String,
    pub discount_percentage: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderDetailDto {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_slug: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub ship_address: String,
    pub ship_tel: String,
    pub note: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub discount: Option<OrderDiscountDto>,
    pub details: Vec<OrderDetailDto>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

impl OrderDto {
    /// Prices every line with the order's own discount.
    pub fn from_parts(row: OrderWithDiscount, details: Vec<OrderDetailWithProduct>) -> Self {
        let lines: Vec<PricedLine> = details
            .iter()
            .map(|d| PricedLine { price: d.detail.price, quantity: d.detail.quantity })
            .collect();
        let pricing = price_order(&lines, row.discount_percentage);

        let details = details
            .into_iter()
            .zip(pricing.line_totals.iter().copied())
            .map(|(d, total_price)| OrderDetailDto {
                product_id: d.detail.product_id,
                product_name: d.product_name,
                product_slug: d.product_slug,
                quantity: d.detail.quantity,
                price: d.detail.price,
                total_price,
            })
            .collect();

        let discount = match (row.discount_code, row.discount_percentage) {
            (Some(code), Some(discount_percentage)) => Some(OrderDiscountDto { code, discount_percentage }),
            _ => None,
        };

        let o = row.order;
        Self {
            id: o.id,
            first_name: o.first_name,
            last_name: o.last_name,
            email: o.email,
            ship_address: o.ship_address,
            ship_tel: o.ship_tel,
            note: o.note,
            order_date: o.order_date,
            status: o.status,
            discount,
            details,
            subtotal: pricing.subtotal,
            discount_amount: pricing.discount_amount,
            total: pricing.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListItem {
    pub id: Uuid,
    pub customer_name: String,
    pub email: String,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub discount_code: Option<String>,
    pub item_count: i64,
    pub total: Decimal,
}

impl From<OrderDto> for OrderListItem {
    fn from(o: OrderDto) -> Self {
        Self {
            id: o.id,
            customer_name: format!("{} {}", o.first_name, o.last_name).trim().to_string(),
            email: o.email,
            status: o.status,
            order_date: o.order_date,
            discount_code: o.discount.map(|d| d.code),
            item_count: o.details.iter().map(|d| i64::from(d.quantity)).sum(),
            total: o.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{Order, OrderDetail};
    use rust_decimal_macros::dec;

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            first_name: "Phát".into(),
            last_name: String::new(),
            email: "2014478@gmail.com".into(),
            ship_address: "DLU".into(),
            ship_tel: "012345678".into(),
            note: String::new(),
            discount_code: Some("  ".into()),
            items: vec![OrderItemRequest { product_id: Uuid::new_v4(), quantity: 2 }],
        }
    }

    fn order_row(discount: Option<Decimal>) -> OrderWithDiscount {
        OrderWithDiscount {
            order: Order {
                id: Uuid::new_v4(),
                discount_id: discount.map(|_| Uuid::new_v4()),
                first_name: "Phát".into(),
                last_name: String::new(),
                email: "2014478@gmail.com".into(),
                ship_address: "DLU".into(),
                ship_tel: "012345678".into(),
                note: String::new(),
                order_date: Utc::now(),
                status: "new".into(),
            },
            discount_code: discount.map(|_| "100000001".to_string()),
            discount_percentage: discount,
        }
    }

    fn detail(order_id: Uuid, price: Decimal, quantity: i32) -> OrderDetailWithProduct {
        OrderDetailWithProduct {
            detail: OrderDetail { order_id, product_id: Uuid::new_v4(), quantity, price },
            product_name: "Book".into(),
            product_slug: "book".into(),
        }
    }

    #[test]
    fn valid_request_passes_and_blank_code_is_none() {
        let req = request();
        assert!(req.validate().is_ok());
        assert_eq!(req.discount_code(), None);
    }

    #[test]
    fn duplicate_lines_are_rejected() {
        let mut req = request();
        let id = req.items[0].product_id;
        req.items.push(OrderItemRequest { product_id: id, quantity: 1 });
        assert!(req.validate().is_err());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let mut req = request();
        req.items[0].quantity = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_order_and_bad_email_are_rejected() {
        let mut req = request();
        req.items.clear();
        assert!(req.validate().is_err());

        let mut req = request();
        req.email = "nope".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn details_use_the_order_discount() {
        let row = order_row(Some(dec!(0.5)));
        let id = row.order.id;
        let dto = OrderDto::from_parts(row, vec![detail(id, dec!(100000), 2), detail(id, dec!(50), 3)]);

        let totals: Vec<Decimal> = dto.details.iter().map(|d| d.total_price).collect();
        assert_eq!(totals, vec![dec!(100000), dec!(75)]);
        assert_eq!(dto.total, dec!(100075));
        assert_eq!(dto.subtotal, dec!(200150));
        assert_eq!(dto.discount.as_ref().map(|d| d.code.as_str()), Some("100000001"));
    }

    #[test]
    fn order_without_discount_is_full_price() {
        let row = order_row(None);
        let id = row.order.id;
        let dto = OrderDto::from_parts(row, vec![detail(id, dec!(50), 3)]);
        assert_eq!(dto.details[0].total_price, dec!(150));
        assert!(dto.discount.is_none());
        assert_eq!(dto.discount_amount, Decimal::ZERO);
    }

    #[test]
    fn list_item_counts_units() {
        let row = order_row(None);
        let id = row.order.id;
        let item = OrderListItem::from(OrderDto::from_parts(row, vec![detail(id, dec!(1), 2), detail(id, dec!(2), 3)]));
        assert_eq!(item.item_count, 5);
        assert_eq!(item.total, dec!(8));
        assert_eq!(item.customer_name, "Phát");
    }

    #[test]
    fn status_deserializes_lowercase() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"shipping"}"#).unwrap();
        assert_eq!(req.status, OrderStatus::Shipping);
        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status":"lost"}"#).is_err());
    }
}
