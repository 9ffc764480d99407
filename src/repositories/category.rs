// src/repositories/category.rs
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dtos::category::{CategoryEditModel, CategoryQuery};
use crate::dtos::paging::{PagedList, PagingParams, SortOrder};
use crate::error::{map_unique_violation, AppError};
use crate::models::category::{Category, CategoryWithCount};
use crate::repositories::like_pattern;
use crate::slug::slug_taken;

const CATEGORY_WITH_COUNT: &str = "SELECT c.id, c.name, c.description, c.url_slug, c.show_on_menu, \
        (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id) AS product_count \
     FROM categories c";

pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn get_paged_categories(
        &self,
        query: &CategoryQuery,
        paging: &PagingParams,
    ) -> Result<PagedList<CategoryWithCount>, AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM categories c");
        push_category_filters(&mut count_qb, query);
        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(CATEGORY_WITH_COUNT);
        push_category_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(paging.order_by(
                &[("name", "c.name"), ("url_slug", "c.url_slug"), ("product_count", "product_count")],
                "c.name",
                SortOrder::Asc,
            ))
            .push(" LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let items = qb.build_query_as::<CategoryWithCount>().fetch_all(&self.pool).await?;

        Ok(PagedList::new(items, paging, total))
    }

    pub async fn get_category_by_id(&self, id: Uuid) -> Result<Option<CategoryWithCount>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(CATEGORY_WITH_COUNT);
        qb.push(" WHERE c.id = ").push_bind(id);
        Ok(qb.build_query_as::<CategoryWithCount>().fetch_optional(&self.pool).await?)
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<CategoryWithCount>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(CATEGORY_WITH_COUNT);
        qb.push(" WHERE c.url_slug = ").push_bind(slug);
        Ok(qb.build_query_as::<CategoryWithCount>().fetch_optional(&self.pool).await?)
    }

    pub async fn is_category_slug_existed(&self, id: Option<Uuid>, slug: &str) -> Result<bool, AppError> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE url_slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(slug_taken(owner, id))
    }

    #[instrument(skip(self, model))]
    pub async fn create_category(&self, model: &CategoryEditModel, slug: &str) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description, url_slug, show_on_menu)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, description, url_slug, show_on_menu"
        )
        .bind(Uuid::new_v4())
        .bind(model.name.trim())
        .bind(&model.description)
        .bind(slug)
        .bind(model.show_on_menu)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Slug already exists"))?;

        info!(id = %category.id, slug, "Created category");
        Ok(category)
    }

    #[instrument(skip(self, model))]
    pub async fn update_category(&self, id: Uuid, model: &CategoryEditModel, slug: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, description = $3, url_slug = $4, show_on_menu = $5
             WHERE id = $1
             RETURNING id, name, description, url_slug, show_on_menu"
        )
        .bind(id)
        .bind(model.name.trim())
        .bind(&model.description)
        .bind(slug)
        .bind(model.show_on_menu)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Slug already exists"))?;

        Ok(category)
    }

    /// Refuses to delete a category that still holds products.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        let in_use = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE category_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if in_use {
            return Err(AppError::conflict("Category still contains products"));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_category_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &CategoryQuery) {
    qb.push(" WHERE 1=1");
    if let Some(keyword) = query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        let pattern = like_pattern(keyword);
        qb.push(" AND (c.name ILIKE ").push_bind(pattern.clone())
            .push(" OR c.description ILIKE ").push_bind(pattern)
            .push(")");
    }
    if let Some(show) = query.show_on_menu {
        qb.push(" AND c.show_on_menu = ").push_bind(show);
    }
}
