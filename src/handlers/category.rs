// src/handlers/category.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::category::{CategoryDto, CategoryEditModel, CategoryItem, CategoryQuery};
use crate::dtos::paging::{PagedList, PagingParams};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::repositories::category::CategoryRepository;
use crate::state::AppState;

// GET /api/categories
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
    Query(filter): Query<CategoryQuery>,
    Query(paging): Query<PagingParams>,
) -> Result<Json<PagedList<CategoryItem>>, AppError> {
    let page = CategoryRepository::new(state.db_pool.clone())
        .get_paged_categories(&filter, &paging)
        .await?;
    Ok(Json(page.map(CategoryItem::from)))
}

// GET /api/categories/{id}
#[instrument(skip(state))]
pub async fn get_category(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<CategoryItem>, AppError> {
    let category = CategoryRepository::new(state.db_pool.clone())
        .get_category_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    Ok(Json(CategoryItem::from(category)))
}

// GET /api/categories/byslug/{slug}
#[instrument(skip(state))]
pub async fn get_category_by_slug(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CategoryItem>, AppError> {
    let category = CategoryRepository::new(state.db_pool.clone())
        .get_category_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    Ok(Json(CategoryItem::from(category)))
}

// POST /api/categories
#[instrument(skip(state, auth, model))]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(model): Json<CategoryEditModel>,
) -> Result<(StatusCode, Json<CategoryDto>), AppError> {
    auth.require_staff()?;
    let slug = model.validate()?;

    let repo = CategoryRepository::new(state.db_pool.clone());
    if repo.is_category_slug_existed(None, &slug).await? {
        return Err(AppError::conflict(format!("Slug '{slug}' already exists")));
    }

    let category = repo.create_category(&model, &slug).await?;
    Ok((StatusCode::CREATED, Json(CategoryDto::from(category))))
}

// PUT /api/categories/{id}
#[instrument(skip(state, auth, model))]
pub async fn update_category(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(model): Json<CategoryEditModel>,
) -> Result<Json<CategoryDto>, AppError> {
    auth.require_staff()?;
    let slug = model.validate()?;

    let repo = CategoryRepository::new(state.db_pool.clone());
    if repo.is_category_slug_existed(Some(id), &slug).await? {
        return Err(AppError::conflict(format!("Slug '{slug}' already exists")));
    }

    let category = repo
        .update_category(id, &model, &slug)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    Ok(Json(CategoryDto::from(category)))
}

// DELETE /api/categories/{id}
#[instrument(skip(state, auth))]
pub async fn delete_category(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    auth.require_staff()?;

    if !CategoryRepository::new(state.db_pool.clone()).delete_category(id).await? {
        return Err(AppError::not_found("Category not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
