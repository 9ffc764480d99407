// src/routes/categories.rs
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use crate::handlers::category::{
    create_category, delete_category, get_categories, get_category, get_category_by_slug, update_category,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}", get(get_category))
        .route("/categories/byslug/{slug}", get(get_category_by_slug));

    let protected = Router::new()
        .route("/categories", post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open.merge(protected)
}
