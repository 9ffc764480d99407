// src/handlers/account.rs
use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use crate::auth::jwt::sign_token;
use crate::auth::password::hash_password;
use crate::dtos::user::{AccessTokenResponse, RegisterUserRequest, UserDto, UserLogin};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::repositories::user::UserRepository;
use crate::state::AppState;

// POST /api/accounts - exchange credentials for a bearer token
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserLogin>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let repo = UserRepository::new(state.db_pool.clone());
    // Unknown user and wrong password answer the same way.
    let user = repo
        .get_user(&payload.username, &payload.password)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let roles = repo.get_roles(user.id).await?;
    let signed = sign_token(&user, &roles, &state.config.jwt_secret)?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(AccessTokenResponse {
        token: signed.token,
        token_type: "bearer",
        expires_at: signed.expires_at,
        user: UserDto::from_parts(user, roles),
    }))
}

// POST /api/accounts/register - admin creates staff accounts
#[instrument(skip(state, auth, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), AppError> {
    auth.require_admin()?;
    payload.validate()?;

    let repo = UserRepository::new(state.db_pool.clone());
    if repo.is_user_existed(&payload.username).await? {
        return Err(AppError::conflict("Username already exists"));
    }

    let password_hash = hash_password(&payload.password)?;
    let (user, roles) = repo.register(&payload, &password_hash).await?;

    Ok((StatusCode::CREATED, Json(UserDto::from_parts(user, roles))))
}

// GET /api/accounts/me
#[instrument(skip(state, auth))]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserDto>, AppError> {
    let repo = UserRepository::new(state.db_pool.clone());
    let user = repo
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let roles = repo.get_roles(user.id).await?;

    Ok(Json(UserDto::from_parts(user, roles)))
}
