// src/handlers/product.rs
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::dtos::paging::{PagedList, PagingParams};
use crate::dtos::product::{
    FeedbackDto, FeedbackEditModel, PictureDto, ProductDetail, ProductDto, ProductEditModel, ProductQuery,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::repositories::collection::CollectionRepository;
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

// GET /api/products - Filtered, paged catalog
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductQuery>,
    Query(paging): Query<PagingParams>,
) -> Result<Json<PagedList<ProductDto>>, AppError> {
    let repo = CollectionRepository::new(state.db_pool.clone());
    let page = repo.get_paged_products(&filter, &paging, ProductDto::from_parts).await?;
    Ok(Json(page))
}

// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn get_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ProductDetail>, AppError> {
    let (row, pictures) = CollectionRepository::new(state.db_pool.clone())
        .get_product_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductDetail::from_parts(row, pictures)))
}

// GET /api/products/byslug/{slug}
#[instrument(skip(state))]
pub async fn get_product_by_slug(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ProductDetail>, AppError> {
    let (row, pictures) = CollectionRepository::new(state.db_pool.clone())
        .get_product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductDetail::from_parts(row, pictures)))
}

// POST /api/products
#[instrument(skip(state, auth, model))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(model): Json<ProductEditModel>,
) -> Result<(StatusCode, Json<ProductDetail>), AppError> {
    auth.require_staff()?;
    let slug = model.validate()?;

    let repo = CollectionRepository::new(state.db_pool.clone());
    if repo.is_product_slug_existed(None, &slug).await? {
        return Err(AppError::conflict(format!("Slug '{slug}' already exists")));
    }

    let id = repo.create_product(&model, &slug).await?;
    let (row, pictures) = repo
        .get_product_by_id(id)
        .await?
        .ok_or_else(|| AppError::internal("Created product vanished"))?;

    Ok((StatusCode::CREATED, Json(ProductDetail::from_parts(row, pictures))))
}

// PUT /api/products/{id}
#[instrument(skip(state, auth, model))]
pub async fn update_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(model): Json<ProductEditModel>,
) -> Result<Json<ProductDetail>, AppError> {
    auth.require_staff()?;
    let slug = model.validate()?;

    let repo = CollectionRepository::new(state.db_pool.clone());
    if repo.is_product_slug_existed(Some(id), &slug).await? {
        return Err(AppError::conflict(format!("Slug '{slug}' already exists")));
    }
    if !repo.update_product(id, &model, &slug).await? {
        return Err(AppError::not_found("Product not found"));
    }

    let (row, pictures) = repo
        .get_product_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    Ok(Json(ProductDetail::from_parts(row, pictures)))
}

// DELETE /api/products/{id}
#[instrument(skip(state, auth))]
pub async fn delete_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    auth.require_staff()?;

    let paths = CollectionRepository::new(state.db_pool.clone())
        .delete_product(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    for path in paths {
        if let Err(e) = state.media.delete_file(&path).await {
            warn!(%path, error = %e, "Could not remove picture file");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/products/{id}/toggle-active
#[instrument(skip(state, auth))]
pub async fn toggle_active(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    auth.require_staff()?;

    let active = CollectionRepository::new(state.db_pool.clone())
        .toggle_active(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(json!({ "id": id, "active": active })))
}

// POST /api/products/{id}/picture - multipart form with an `image` file
#[instrument(skip(state, auth, multipart))]
pub async fn upload_picture(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PictureDto>), AppError> {
    auth.require_staff()?;

    let repo = CollectionRepository::new(state.db_pool.clone());
    if !repo.product_exists(id).await? {
        return Err(AppError::not_found("Product not found"));
    }

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Could not read upload: {e}")))?;
        upload = Some((file_name, content_type, bytes));
        break;
    }

    let (file_name, content_type, bytes) =
        upload.ok_or_else(|| AppError::validation(format!("Missing '{IMAGE_FIELD}' file field")))?;

    let url = state.media.save_file(&bytes, &file_name, &content_type).await?;

    match repo.set_image_url(id, &url).await {
        Ok(Some(picture)) => Ok((StatusCode::CREATED, Json(PictureDto::from(picture)))),
        Ok(None) => {
            let _ = state.media.delete_file(&url).await;
            Err(AppError::not_found("Product not found"))
        }
        Err(e) => {
            let _ = state.media.delete_file(&url).await;
            Err(e)
        }
    }
}

// GET /api/products/{id}/feedbacks
#[instrument(skip(state))]
pub async fn get_feedbacks(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Query(paging): Query<PagingParams>,
) -> Result<Json<PagedList<FeedbackDto>>, AppError> {
    let repo = CollectionRepository::new(state.db_pool.clone());
    if !repo.product_exists(id).await? {
        return Err(AppError::not_found("Product not found"));
    }

    let page = repo.get_feedbacks(id, &paging).await?;
    Ok(Json(page.map(FeedbackDto::from)))
}

// POST /api/products/{id}/feedbacks
#[instrument(skip(state, auth, model))]
pub async fn add_feedback(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(model): Json<FeedbackEditModel>,
) -> Result<(StatusCode, Json<FeedbackDto>), AppError> {
    model.validate()?;

    let repo = CollectionRepository::new(state.db_pool.clone());
    if !repo.product_exists(id).await? {
        return Err(AppError::not_found("Product not found"));
    }

    let feedback = repo.add_feedback(id, &auth.username, &model).await?;
    Ok((StatusCode::CREATED, Json(FeedbackDto::from(feedback))))
}
