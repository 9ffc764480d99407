// src/repositories/order.rs
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dtos::order::{CreateOrderRequest, OrderQuery};
use crate::dtos::paging::{PagedList, PagingParams, SortOrder};
use crate::error::AppError;
use crate::models::discount::DiscountRejection;
use crate::models::order::{OrderDetailWithProduct, OrderStatus, OrderWithDiscount};
use crate::pricing::{subtotal, PricedLine};
use crate::repositories::discount::{consume_discount, lock_discount_by_code};
use crate::repositories::like_pattern;

const ORDER_SELECT: &str = "SELECT o.id, o.discount_id, o.first_name, o.last_name, o.email, o.ship_address, \
        o.ship_tel, o.note, o.order_date, o.status, \
        d.code AS discount_code, d.discount_percentage \
     FROM orders o LEFT JOIN discounts d ON d.id = o.discount_id";

const ORDER_COUNT: &str = "SELECT COUNT(*) FROM orders o";

pub struct OrderRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct StockRow {
    name: String,
    price: Decimal,
    quantity: i32,
    active: bool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checkout. Captures current prices, takes stock and one use of the
    /// discount code, all in one transaction.
    #[instrument(skip(self, req), fields(items = req.items.len()))]
    pub async fn place_order(&self, req: &CreateOrderRequest, now: DateTime<Utc>) -> Result<Uuid, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock products in id order so concurrent checkouts cannot deadlock.
        let mut items: Vec<_> = req.items.iter().collect();
        items.sort_by_key(|item| item.product_id);

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = sqlx::query_as::<_, StockRow>(
                "SELECT name, price, quantity, active FROM products WHERE id = $1 FOR UPDATE"
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", item.product_id)))?;

            if !product.active {
                return Err(AppError::validation(format!("Product '{}' is not available", product.name)));
            }
            if product.quantity < item.quantity {
                return Err(AppError::validation(format!(
                    "Insufficient stock for '{}': requested {}, available {}",
                    product.name, item.quantity, product.quantity
                )));
            }

            sqlx::query("UPDATE products SET quantity = quantity - $2 WHERE id = $1")
                .bind(item.product_id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;

            lines.push((item.product_id, PricedLine { price: product.price, quantity: item.quantity }));
        }

        let discount_id = match req.discount_code() {
            Some(code) => {
                let discount = lock_discount_by_code(&mut *tx, code)
                    .await?
                    .ok_or_else(|| AppError::not_found("Discount code not found"))?;

                let priced: Vec<PricedLine> = lines.iter().map(|(_, line)| *line).collect();
                discount
                    .check_applicable(subtotal(&priced), now)
                    .map_err(|reason| AppError::validation(reason.to_string()))?;

                if !consume_discount(&mut *tx, discount.id).await? {
                    return Err(AppError::validation(DiscountRejection::Exhausted.to_string()));
                }
                Some(discount.id)
            }
            None => None,
        };

        let order_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO orders
                (id, discount_id, first_name, last_name, email, ship_address, ship_tel, note, order_date, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        )
        .bind(order_id)
        .bind(discount_id)
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(req.email.trim())
        .bind(req.ship_address.trim())
        .bind(req.ship_tel.trim())
        .bind(req.note.trim())
        .bind(now)
        .bind(OrderStatus::New.as_str())
        .execute(&mut *tx)
        .await?;

        for (product_id, line) in &lines {
            sqlx::query("INSERT INTO order_details (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)")
                .bind(order_id)
                .bind(product_id)
                .bind(line.quantity)
                .bind(line.price)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(%order_id, discounted = discount_id.is_some(), "Placed order");
        Ok(order_id)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Option<(OrderWithDiscount, Vec<OrderDetailWithProduct>)>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(ORDER_SELECT);
        qb.push(" WHERE o.id = ").push_bind(id);
        let Some(order) = qb.build_query_as::<OrderWithDiscount>().fetch_optional(&self.pool).await? else {
            return Ok(None);
        };

        let mut details = self.details_for(&[id]).await?;
        Ok(Some((order, details.remove(&id).unwrap_or_default())))
    }

    async fn details_for(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderDetailWithProduct>>, AppError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, OrderDetailWithProduct>(
            "SELECT od.order_id, od.product_id, od.quantity, od.price,
                    p.name AS product_name, p.url_slug AS product_slug
             FROM order_details od
             JOIN products p ON p.id = od.product_id
             WHERE od.order_id = ANY($1)
             ORDER BY p.name, od.product_id"
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderDetailWithProduct>> = HashMap::new();
        for row in rows {
            grouped.entry(row.detail.order_id).or_default().push(row);
        }
        Ok(grouped)
    }

    #[instrument(skip(self, mapper))]
    pub async fn get_paged_orders<T, F>(
        &self,
        query: &OrderQuery,
        paging: &PagingParams,
        mut mapper: F,
    ) -> Result<PagedList<T>, AppError>
    where
        F: FnMut(OrderWithDiscount, Vec<OrderDetailWithProduct>) -> T,
    {
        let mut count_qb = QueryBuilder::<Postgres>::new(ORDER_COUNT);
        push_order_filters(&mut count_qb, query);
        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(ORDER_SELECT);
        push_order_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(paging.order_by(
                &[("order_date", "o.order_date"), ("email", "o.email"), ("status", "o.status")],
                "o.order_date",
                SortOrder::Desc,
            ))
            .push(", o.id LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let orders = qb.build_query_as::<OrderWithDiscount>().fetch_all(&self.pool).await?;

        let ids: Vec<Uuid> = orders.iter().map(|o| o.order.id).collect();
        let mut details = self.details_for(&ids).await?;
        let items = orders
            .into_iter()
            .map(|order| {
                let own = details.remove(&order.order.id).unwrap_or_default();
                mapper(order, own)
            })
            .collect();

        Ok(PagedList::new(items, paging, total))
    }

    /// Moves the order to `next`. Cancelling returns the stock and the
    /// discount use. `None` when the order does not exist.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<Option<OrderStatus>, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some((status, discount_id)) = sqlx::query_as::<_, (String, Option<Uuid>)>(
            "SELECT status, discount_id FROM orders WHERE id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let current: OrderStatus = status.parse().map_err(AppError::internal)?;
        if !current.can_transition_to(next) {
            return Err(AppError::validation(format!("Cannot change order status from {current} to {next}")));
        }

        if next == OrderStatus::Cancelled {
            sqlx::query(
                "UPDATE products p SET quantity = p.quantity + od.quantity
                 FROM order_details od
                 WHERE od.order_id = $1 AND p.id = od.product_id"
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;

            if let Some(discount_id) = discount_id {
                sqlx::query("UPDATE discounts SET quantity = quantity + 1 WHERE id = $1")
                    .bind(discount_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(next.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(%id, from = %current, to = %next, "Order status changed");
        Ok(Some(current))
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            warn!(%id, "Deleted order");
        }
        Ok(result.rows_affected() > 0)
    }
}

fn push_order_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &OrderQuery) {
    qb.push(" WHERE 1=1");
    if let Some(status) = query.status {
        qb.push(" AND o.status = ").push_bind(status.as_str());
    }
    if let Some(email) = query.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        qb.push(" AND LOWER(o.email) = LOWER(").push_bind(email.to_string()).push(")");
    }
    if let Some(keyword) = query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        let pattern = like_pattern(keyword);
        qb.push(" AND (o.first_name ILIKE ").push_bind(pattern.clone())
            .push(" OR o.last_name ILIKE ").push_bind(pattern.clone())
            .push(" OR o.email ILIKE ").push_bind(pattern.clone())
            .push(" OR o.ship_tel ILIKE ").push_bind(pattern)
            .push(")");
    }
}
