// src/routes/discounts.rs
use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use crate::handlers::discount::{
    create_discount, delete_discount, get_discount, get_discount_by_code, get_discounts, update_discount,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/discounts/bycode/{code}", get(get_discount_by_code));

    let protected = Router::new()
        .route("/discounts", get(get_discounts).post(create_discount))
        .route("/discounts/{id}", get(get_discount).put(update_discount).delete(delete_discount))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open.merge(protected)
}
