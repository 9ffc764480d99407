// src/repositories/collection.rs
use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dtos::paging::{PagedList, PagingParams, SortOrder};
use crate::dtos::product::{FeedbackEditModel, ProductEditModel, ProductQuery};
use crate::error::{map_unique_violation, AppError};
use crate::models::feedback::Feedback;
use crate::models::picture::Picture;
use crate::models::product::ProductWithCategory;
use crate::repositories::like_pattern;
use crate::slug::slug_taken;

const PRODUCT_SELECT: &str = "SELECT p.id, p.category_id, p.name, p.short_intro, p.description, p.url_slug, \
        p.price, p.quantity, p.discount, p.active, p.create_date, p.update_date, \
        c.name AS category_name, c.url_slug AS category_slug \
     FROM products p JOIN categories c ON c.id = p.category_id";

const PRODUCT_COUNT: &str = "SELECT COUNT(*) FROM products p JOIN categories c ON c.id = p.category_id";

const PRODUCT_SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "p.name"),
    ("price", "p.price"),
    ("quantity", "p.quantity"),
    ("create_date", "p.create_date"),
    ("category", "c.name"),
];

/// Products together with their pictures and feedback.
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_id(&self, id: Uuid) -> Result<Option<(ProductWithCategory, Vec<Picture>)>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.id = ").push_bind(id);
        let row = qb.build_query_as::<ProductWithCategory>().fetch_optional(&self.pool).await?;
        self.with_pictures(row).await
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Option<(ProductWithCategory, Vec<Picture>)>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.url_slug = ").push_bind(slug);
        let row = qb.build_query_as::<ProductWithCategory>().fetch_optional(&self.pool).await?;
        self.with_pictures(row).await
    }

    async fn with_pictures(
        &self,
        row: Option<ProductWithCategory>,
    ) -> Result<Option<(ProductWithCategory, Vec<Picture>)>, AppError> {
        match row {
            Some(row) => {
                let mut pictures = self.pictures_for(&[row.product.id]).await?;
                let own = pictures.remove(&row.product.id).unwrap_or_default();
                Ok(Some((row, own)))
            }
            None => Ok(None),
        }
    }

    async fn pictures_for(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Picture>>, AppError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let pictures = sqlx::query_as::<_, Picture>(
            "SELECT id, product_id, path, active FROM pictures
             WHERE product_id = ANY($1)
             ORDER BY active DESC, path"
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Picture>> = HashMap::new();
        for picture in pictures {
            grouped.entry(picture.product_id).or_default().push(picture);
        }
        Ok(grouped)
    }

    /// Filters, sorts and pages the catalog, then projects each row with `mapper`.
    #[instrument(skip(self, mapper))]
    pub async fn get_paged_products<T, F>(
        &self,
        query: &ProductQuery,
        paging: &PagingParams,
        mut mapper: F,
    ) -> Result<PagedList<T>, AppError>
    where
        F: FnMut(ProductWithCategory, Vec<Picture>) -> T,
    {
        let mut count_qb = QueryBuilder::<Postgres>::new(PRODUCT_COUNT);
        push_product_filters(&mut count_qb, query);
        let total: i64 = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        push_product_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(paging.order_by(PRODUCT_SORT_COLUMNS, "p.create_date", SortOrder::Desc))
            .push(", p.id LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let rows = qb.build_query_as::<ProductWithCategory>().fetch_all(&self.pool).await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.product.id).collect();
        let mut pictures = self.pictures_for(&ids).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let own = pictures.remove(&row.product.id).unwrap_or_default();
                mapper(row, own)
            })
            .collect();

        Ok(PagedList::new(items, paging, total))
    }

    pub async fn find_product_slug_owner(&self, slug: &str) -> Result<Option<Uuid>, AppError> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE url_slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    /// `id` is `None` for a new product, `Some` for the product being updated.
    pub async fn is_product_slug_existed(&self, id: Option<Uuid>, slug: &str) -> Result<bool, AppError> {
        let owner = self.find_product_slug_owner(slug).await?;
        Ok(slug_taken(owner, id))
    }

    async fn ensure_category_exists(&self, category_id: Uuid) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            Ok(())
        } else {
            Err(AppError::validation(format!("Category {category_id} does not exist")))
        }
    }

    #[instrument(skip(self, model))]
    pub async fn create_product(&self, model: &ProductEditModel, slug: &str) -> Result<Uuid, AppError> {
        self.ensure_category_exists(model.category_id).await?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO products
                (id, category_id, name, short_intro, description, url_slug, price, quantity, discount, active, create_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        )
        .bind(id)
        .bind(model.category_id)
        .bind(model.name.trim())
        .bind(&model.short_intro)
        .bind(&model.description)
        .bind(slug)
        .bind(model.price)
        .bind(model.quantity)
        .bind(model.discount)
        .bind(model.active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Slug already exists"))?;

        info!(%id, slug, "Created product");
        Ok(id)
    }

    /// Returns false when no product has `id`.
    #[instrument(skip(self, model))]
    pub async fn update_product(&self, id: Uuid, model: &ProductEditModel, slug: &str) -> Result<bool, AppError> {
        self.ensure_category_exists(model.category_id).await?;

        let result = sqlx::query(
            "UPDATE products SET
                category_id = $2, name = $3, short_intro = $4, description = $5, url_slug = $6,
                price = $7, quantity = $8, discount = $9, active = $10, update_date = $11
             WHERE id = $1"
        )
        .bind(id)
        .bind(model.category_id)
        .bind(model.name.trim())
        .bind(&model.short_intro)
        .bind(&model.description)
        .bind(slug)
        .bind(model.price)
        .bind(model.quantity)
        .bind(model.discount)
        .bind(model.active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Slug already exists"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes the product and its pictures, returning the picture paths so
    /// the stored files can be removed. `None` when the product is unknown.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<Option<Vec<String>>, AppError> {
        let mut tx = self.pool.begin().await?;

        let paths = sqlx::query_scalar::<_, String>("SELECT path FROM pictures WHERE product_id = $1")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                    AppError::conflict("Product is referenced by existing orders")
                }
                other => other.into(),
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        tx.commit().await?;

        info!(%id, "Deleted product");
        Ok(Some(paths))
    }

    /// Flips the active flag, returning the new value.
    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<bool>, AppError> {
        let active = sqlx::query_scalar::<_, bool>(
            "UPDATE products SET active = NOT active, update_date = NOW() WHERE id = $1 RETURNING active"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(active)
    }

    /// Attaches an active picture to the product; `None` if the product is unknown.
    #[instrument(skip(self))]
    pub async fn set_image_url(&self, product_id: Uuid, image_url: &str) -> Result<Option<Picture>, AppError> {
        if !self.product_exists(product_id).await? {
            return Ok(None);
        }

        let picture = sqlx::query_as::<_, Picture>(
            "INSERT INTO pictures (id, product_id, path, active) VALUES ($1, $2, $3, TRUE)
             RETURNING id, product_id, path, active"
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(picture))
    }

    pub async fn product_exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn get_feedbacks(&self, product_id: Uuid, paging: &PagingParams) -> Result<PagedList<Feedback>, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedbacks WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, product_id, user_name, content, rate, post_date FROM feedbacks WHERE product_id = "
        );
        qb.push_bind(product_id)
            .push(" ORDER BY ")
            .push(paging.order_by(&[("rate", "rate"), ("post_date", "post_date")], "post_date", SortOrder::Desc))
            .push(" LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let items = qb.build_query_as::<Feedback>().fetch_all(&self.pool).await?;

        Ok(PagedList::new(items, paging, total))
    }

    pub async fn add_feedback(
        &self,
        product_id: Uuid,
        user_name: &str,
        model: &FeedbackEditModel,
    ) -> Result<Feedback, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedbacks (id, product_id, user_name, content, rate, post_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, product_id, user_name, content, rate, post_date"
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(user_name)
        .bind(model.content.trim())
        .bind(model.rate)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(feedback)
    }
}

/// Appends the catalog `WHERE` clause; each filter is only added when set.
pub fn push_product_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    qb.push(" WHERE 1=1");

    if let Some(year) = query.year.filter(|&y| y > 0) {
        qb.push(" AND EXTRACT(YEAR FROM p.create_date)::INT = ").push_bind(year);
    }
    if let Some(month) = query.month.filter(|&m| m > 0) {
        qb.push(" AND EXTRACT(MONTH FROM p.create_date)::INT = ").push_bind(month);
    }
    if let Some(day) = query.day.filter(|&d| d > 0) {
        qb.push(" AND EXTRACT(DAY FROM p.create_date)::INT = ").push_bind(day);
    }
    if let Some(slug) = non_blank(&query.category_slug) {
        qb.push(" AND c.url_slug ILIKE ").push_bind(like_pattern(slug));
    }
    if let Some(slug) = non_blank(&query.product_slug) {
        qb.push(" AND p.url_slug ILIKE ").push_bind(like_pattern(slug));
    }
    if let Some(keyword) = non_blank(&query.keyword) {
        let pattern = like_pattern(keyword);
        qb.push(" AND (p.name ILIKE ").push_bind(pattern.clone())
            .push(" OR p.description ILIKE ").push_bind(pattern.clone())
            .push(" OR p.short_intro ILIKE ").push_bind(pattern.clone())
            .push(" OR p.url_slug ILIKE ").push_bind(pattern)
            .push(")");
    }
    if let Some(active) = query.active {
        qb.push(" AND p.active = ").push_bind(active);
    }
    if let Some(min) = query.min_price {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        qb.push(" AND p.price <= ").push_bind(max);
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn filter_sql(query: &ProductQuery) -> String {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_COUNT);
        push_product_filters(&mut qb, query);
        qb.sql().to_string()
    }

    #[test]
    fn no_filters_means_no_conditions() {
        let sql = filter_sql(&ProductQuery::default());
        assert!(sql.ends_with("WHERE 1=1"));
    }

    #[test]
    fn zero_date_parts_are_ignored() {
        let sql = filter_sql(&ProductQuery { year: Some(0), month: Some(0), day: Some(-1), ..Default::default() });
        assert!(!sql.contains("EXTRACT"));

        let sql = filter_sql(&ProductQuery { year: Some(2023), month: Some(4), ..Default::default() });
        assert!(sql.contains("EXTRACT(YEAR FROM p.create_date)::INT = $1"));
        assert!(sql.contains("EXTRACT(MONTH FROM p.create_date)::INT = $2"));
        assert!(!sql.contains("DAY"));
    }

    #[test]
    fn keyword_searches_four_columns() {
        let sql = filter_sql(&ProductQuery { keyword: Some("kaze".into()), ..Default::default() });
        assert!(sql.contains("p.name ILIKE $1"));
        assert!(sql.contains("p.description ILIKE $2"));
        assert!(sql.contains("p.short_intro ILIKE $3"));
        assert!(sql.contains("p.url_slug ILIKE $4"));
    }

    #[test]
    fn blank_strings_are_ignored() {
        let sql = filter_sql(&ProductQuery {
            keyword: Some("   ".into()),
            category_slug: Some(String::new()),
            ..Default::default()
        });
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn slug_and_price_filters_bind_in_order() {
        let sql = filter_sql(&ProductQuery {
            category_slug: Some("manga".into()),
            product_slug: Some("tro-ve".into()),
            active: Some(true),
            min_price: Some(Decimal::TEN),
            max_price: Some(Decimal::from(20)),
            ..Default::default()
        });
        assert!(sql.contains("c.url_slug ILIKE $1"));
        assert!(sql.contains("p.url_slug ILIKE $2"));
        assert!(sql.contains("p.active = $3"));
        assert!(sql.contains("p.price >= $4"));
        assert!(sql.contains("p.price <= $5"));
    }
}
