// src/routes/orders.rs
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use crate::handlers::order::{create_order, delete_order, get_order, get_orders, update_order_status};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/orders", post(create_order));

    let protected = Router::new()
        .route("/orders", get(get_orders))
        .route("/orders/{id}", get(get_order).delete(delete_order))
        .route("/orders/{id}/status", put(update_order_status))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open.merge(protected)
}
