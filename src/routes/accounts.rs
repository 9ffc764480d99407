// src/routes/accounts.rs
use axum::{Router, routing::{post, get}, middleware};
use crate::state::AppState;
use crate::handlers::account::{login, register, get_me};
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/accounts", post(login));

    let protected = Router::new()
        .route("/accounts/register", post(register))
        .route("/accounts/me", get(get_me))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open.merge(protected)
}
