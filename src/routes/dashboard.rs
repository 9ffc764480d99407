// src/routes/dashboard.rs
use axum::{Router, routing::get, middleware};
use crate::state::AppState;
use crate::handlers::dashboard::get_dashboard;
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
