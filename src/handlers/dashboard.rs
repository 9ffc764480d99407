// src/handlers/dashboard.rs
use axum::{extract::State, Extension, Json};
use chrono::Utc;
use tracing::instrument;

use crate::dtos::dashboard::DashboardResponse;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::repositories::dashboard::DashboardRepository;
use crate::state::AppState;

// GET /api/dashboard
#[instrument(skip(state, auth))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DashboardResponse>, AppError> {
    auth.require_staff()?;
    let summary = DashboardRepository::new(state.db_pool.clone())
        .summary(Utc::now())
        .await?;
    Ok(Json(summary))
}
