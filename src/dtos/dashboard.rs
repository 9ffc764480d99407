// src/dtos/dashboard.rs
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_products: i64,
    pub total_categories: i64,
    pub total_users: i64,
    pub total_orders: i64,
    pub orders_by_status: BTreeMap<String, i64>,
    pub new_orders_today: i64,
    /// Sum of line totals over delivered orders.
    pub revenue: Decimal,
}
