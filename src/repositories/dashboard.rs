// src/repositories/dashboard.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::BTreeMap;

use crate::dtos::dashboard::DashboardResponse;
use crate::error::AppError;
use crate::models::order::OrderStatus;
use crate::pricing::line_total;

#[derive(sqlx::FromRow)]
struct Counts {
    total_products: i64,
    total_categories: i64,
    total_users: i64,
    total_orders: i64,
    new_orders_today: i64,
}

#[derive(sqlx::FromRow)]
struct DeliveredLine {
    price: Decimal,
    quantity: i32,
    discount_percentage: Option<Decimal>,
}

pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary(&self, now: DateTime<Utc>) -> Result<DashboardResponse, AppError> {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(now);

        let counts = sqlx::query_as::<_, Counts>(
            "SELECT
                (SELECT COUNT(*) FROM products)   AS total_products,
                (SELECT COUNT(*) FROM categories) AS total_categories,
                (SELECT COUNT(*) FROM users)      AS total_users,
                (SELECT COUNT(*) FROM orders)     AS total_orders,
                (SELECT COUNT(*) FROM orders WHERE order_date >= $1) AS new_orders_today"
        )
        .bind(day_start)
        .fetch_one(&self.pool)
        .await?;

        let by_status = sqlx::query_as::<_, (String, i64)>("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut orders_by_status: BTreeMap<String, i64> = OrderStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for (status, count) in by_status {
            orders_by_status.insert(status, count);
        }

        // Revenue goes through the same line pricing as order totals.
        let delivered = sqlx::query_as::<_, DeliveredLine>(
            "SELECT od.price, od.quantity, d.discount_percentage
             FROM order_details od
             JOIN orders o ON o.id = od.order_id
             LEFT JOIN discounts d ON d.id = o.discount_id
             WHERE o.status = $1"
        )
        .bind(OrderStatus::Delivered.as_str())
        .fetch_all(&self.pool)
        .await?;

        let revenue: Decimal = delivered
            .iter()
            .map(|l| line_total(l.price, l.quantity, l.discount_percentage))
            .sum();

        Ok(DashboardResponse {
            total_products: counts.total_products,
            total_categories: counts.total_categories,
            total_users: counts.total_users,
            total_orders: counts.total_orders,
            orders_by_status,
            new_orders_today: counts.new_orders_today,
            revenue,
        })
    }
}
