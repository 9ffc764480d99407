// src/repositories/discount.rs
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dtos::discount::{DiscountEditModel, DiscountQuery};
use crate::dtos::paging::{PagedList, PagingParams, SortOrder};
use crate::error::{map_unique_violation, AppError};
use crate::models::discount::Discount;
use crate::repositories::like_pattern;

const DISCOUNT_COLUMNS: &str = "id, name, code, discount_percentage, expiry_date, min_price, quantity, active";

pub struct DiscountRepository {
    pool: PgPool,
}

impl DiscountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn get_paged_discounts(
        &self,
        query: &DiscountQuery,
        paging: &PagingParams,
    ) -> Result<PagedList<Discount>, AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM discounts");
        push_discount_filters(&mut count_qb, query);
        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {DISCOUNT_COLUMNS} FROM discounts"));
        push_discount_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(paging.order_by(
                &[
                    ("code", "code"),
                    ("name", "name"),
                    ("expiry_date", "expiry_date"),
                    ("discount_percentage", "discount_percentage"),
                ],
                "expiry_date",
                SortOrder::Desc,
            ))
            .push(" LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let items = qb.build_query_as::<Discount>().fetch_all(&self.pool).await?;

        Ok(PagedList::new(items, paging, total))
    }

    pub async fn get_discount_by_id(&self, id: Uuid) -> Result<Option<Discount>, AppError> {
        let discount = sqlx::query_as::<_, Discount>(&format!("SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(discount)
    }

    pub async fn get_discount_by_code(&self, code: &str) -> Result<Option<Discount>, AppError> {
        let discount = sqlx::query_as::<_, Discount>(&format!("SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE code = $1"))
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(discount)
    }

    #[instrument(skip(self, model), fields(code = %model.code))]
    pub async fn create_discount(&self, model: &DiscountEditModel) -> Result<Discount, AppError> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            "INSERT INTO discounts (id, name, code, discount_percentage, expiry_date, min_price, quantity, active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(model.name.trim())
        .bind(model.code.trim())
        .bind(model.discount_percentage)
        .bind(model.expiry_date)
        .bind(model.min_price)
        .bind(model.quantity)
        .bind(model.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Discount code already exists"))?;

        info!(id = %discount.id, "Created discount");
        Ok(discount)
    }

    #[instrument(skip(self, model))]
    pub async fn update_discount(&self, id: Uuid, model: &DiscountEditModel) -> Result<Option<Discount>, AppError> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            "UPDATE discounts SET name = $2, code = $3, discount_percentage = $4, expiry_date = $5,
                min_price = $6, quantity = $7, active = $8
             WHERE id = $1
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(model.name.trim())
        .bind(model.code.trim())
        .bind(model.discount_percentage)
        .bind(model.expiry_date)
        .bind(model.min_price)
        .bind(model.quantity)
        .bind(model.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Discount code already exists"))?;

        Ok(discount)
    }

    /// Orders keep their lines; their discount reference is cleared.
    pub async fn delete_discount(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Locks the discount row for the rest of the checkout transaction.
pub async fn lock_discount_by_code(conn: &mut PgConnection, code: &str) -> Result<Option<Discount>, AppError> {
    let discount = sqlx::query_as::<_, Discount>(&format!(
        "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE code = $1 FOR UPDATE"
    ))
    .bind(code)
    .fetch_optional(conn)
    .await?;
    Ok(discount)
}

/// Consumes one use of the code; false when it is already used up.
pub async fn consume_discount(conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE discounts SET quantity = quantity - 1 WHERE id = $1 AND quantity > 0")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

fn push_discount_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &DiscountQuery) {
    qb.push(" WHERE 1=1");
    if let Some(keyword) = query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        let pattern = like_pattern(keyword);
        qb.push(" AND (code ILIKE ").push_bind(pattern.clone())
            .push(" OR name ILIKE ").push_bind(pattern)
            .push(")");
    }
    if let Some(active) = query.active {
        qb.push(" AND active = ").push_bind(active);
    }
}
