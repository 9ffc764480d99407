// src/handlers/discount.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::discount::{DiscountDto, DiscountEditModel, DiscountQuery};
use crate::dtos::paging::{PagedList, PagingParams};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::repositories::discount::DiscountRepository;
use crate::state::AppState;

// GET /api/discounts
#[instrument(skip(state, auth))]
pub async fn get_discounts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<DiscountQuery>,
    Query(paging): Query<PagingParams>,
) -> Result<Json<PagedList<DiscountDto>>, AppError> {
    auth.require_staff()?;
    let page = DiscountRepository::new(state.db_pool.clone())
        .get_paged_discounts(&filter, &paging)
        .await?;
    Ok(Json(page.map(DiscountDto::from)))
}

// GET /api/discounts/{id}
#[instrument(skip(state, auth))]
pub async fn get_discount(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DiscountDto>, AppError> {
    auth.require_staff()?;
    let discount = DiscountRepository::new(state.db_pool.clone())
        .get_discount_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Discount not found"))?;
    Ok(Json(DiscountDto::from(discount)))
}

// GET /api/discounts/bycode/{code} - public so shoppers can preview a code
#[instrument(skip(state))]
pub async fn get_discount_by_code(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DiscountDto>, AppError> {
    let discount = DiscountRepository::new(state.db_pool.clone())
        .get_discount_by_code(&code)
        .await?
        .ok_or_else(|| AppError::not_found("Discount not found"))?;
    Ok(Json(DiscountDto::from(discount)))
}

// POST /api/discounts
#[instrument(skip(state, auth, model))]
pub async fn create_discount(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(model): Json<DiscountEditModel>,
) -> Result<(StatusCode, Json<DiscountDto>), AppError> {
    auth.require_staff()?;
    model.validate()?;

    let discount = DiscountRepository::new(state.db_pool.clone())
        .create_discount(&model)
        .await?;
    Ok((StatusCode::CREATED, Json(DiscountDto::from(discount))))
}

// PUT /api/discounts/{id}
#[instrument(skip(state, auth, model))]
pub async fn update_discount(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(model): Json<DiscountEditModel>,
) -> Result<Json<DiscountDto>, AppError> {
    auth.require_staff()?;
    model.validate()?;

    let discount = DiscountRepository::new(state.db_pool.clone())
        .update_discount(id, &model)
        .await?
        .ok_or_else(|| AppError::not_found("Discount not found"))?;
    Ok(Json(DiscountDto::from(discount)))
}

// DELETE /api/discounts/{id}
#[instrument(skip(state, auth))]
pub async fn delete_discount(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    auth.require_staff()?;
    if !DiscountRepository::new(state.db_pool.clone()).delete_discount(id).await? {
        return Err(AppError::not_found("Discount not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
