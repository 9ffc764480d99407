// src/routes/products.rs
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use crate::handlers::product::{
    add_feedback, create_product, delete_product, get_feedbacks, get_product, get_product_by_slug,
    get_products, toggle_active, update_product, upload_picture,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/products", get(get_products))
        .route("/products/{id}", get(get_product))
        .route("/products/byslug/{slug}", get(get_product_by_slug))
        .route("/products/{id}/feedbacks", get(get_feedbacks));

    let protected = Router::new()
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/products/{id}/toggle-active", post(toggle_active))
        .route(
            "/products/{id}/picture",
            post(upload_picture).layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/products/{id}/feedbacks", post(add_feedback))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open.merge(protected)
}
