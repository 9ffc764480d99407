// src/handlers/order.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::order::{CreateOrderRequest, OrderDto, OrderListItem, OrderQuery, UpdateStatusRequest};
use crate::dtos::paging::{PagedList, PagingParams};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::repositories::order::OrderRepository;
use crate::state::AppState;

// POST /api/orders - public checkout
#[instrument(skip(state, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDto>), AppError> {
    payload.validate()?;

    let repo = OrderRepository::new(state.db_pool.clone());
    let id = repo.place_order(&payload, Utc::now()).await?;
    let (row, details) = repo
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::internal("Placed order vanished"))?;

    Ok((StatusCode::CREATED, Json(OrderDto::from_parts(row, details))))
}

// GET /api/orders
#[instrument(skip(state, auth))]
pub async fn get_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<OrderQuery>,
    Query(paging): Query<PagingParams>,
) -> Result<Json<PagedList<OrderListItem>>, AppError> {
    auth.require_staff()?;
    let page = OrderRepository::new(state.db_pool.clone())
        .get_paged_orders(&filter, &paging, |row, details| {
            OrderListItem::from(OrderDto::from_parts(row, details))
        })
        .await?;
    Ok(Json(page))
}

// GET /api/orders/{id}
#[instrument(skip(state, auth))]
pub async fn get_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<OrderDto>, AppError> {
    auth.require_staff()?;
    let (row, details) = OrderRepository::new(state.db_pool.clone())
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(OrderDto::from_parts(row, details)))
}

// PUT /api/orders/{id}/status
#[instrument(skip(state, auth, payload))]
pub async fn update_order_status(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<OrderDto>, AppError> {
    auth.require_staff()?;

    let repo = OrderRepository::new(state.db_pool.clone());
    repo.update_status(id, payload.status)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let (row, details) = repo
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(OrderDto::from_parts(row, details)))
}

// DELETE /api/orders/{id}
#[instrument(skip(state, auth))]
pub async fn delete_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    if !OrderRepository::new(state.db_pool.clone()).delete_order(id).await? {
        return Err(AppError::not_found("Order not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
