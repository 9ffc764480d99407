// src/routes/mod.rs
pub mod accounts;
pub mod categories;
pub mod dashboard;
pub mod discounts;
pub mod orders;
pub mod products;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::media::PUBLIC_PREFIX;
use crate::state::AppState;

/// Every `/api` route. Protected sub-routers carry their own auth layer.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(products::routes(state))
        .merge(categories::routes(state))
        .merge(discounts::routes(state))
        .merge(orders::routes(state))
        .merge(accounts::routes(state))
        .merge(dashboard::routes(state))
}

/// The whole application: API, uploaded files, health probe.
pub fn create_app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/", get(|| async { "Bookstore API" }))
        .route("/health", get(health_check))
        .nest("/api", create_router(&state))
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
