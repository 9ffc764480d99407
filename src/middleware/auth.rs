// src/middleware/auth.rs
use axum::{response::{Response, IntoResponse}};
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::Next;
use http::header::AUTHORIZATION;
use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::models::user::{ROLE_ADMIN, ROLE_MANAGER};
use crate::state::AppState;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl AuthContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn require_any_role(&self, roles: &[&str]) -> Result<(), AppError> {
        if roles.iter().any(|role| self.has_role(role)) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Requires one of the roles: {}", roles.join(", "))))
        }
    }

    /// Catalog and order administration.
    pub fn require_staff(&self) -> Result<(), AppError> {
        self.require_any_role(&[ROLE_ADMIN, ROLE_MANAGER])
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_any_role(&[ROLE_ADMIN])
    }
}

#[derive(Serialize)]
struct ErrorBody { error: String, code: &'static str }

use axum::http::Request;

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = match req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return unauthorized("Missing Authorization header"),
    };

    // Expect "Bearer <token>", scheme is case-insensitive
    let token = match bearer_token(auth_header) {
        Some(t) => t,
        None => return unauthorized("Invalid Authorization format"),
    };

    let claims = match verify_token(token, &state.config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return unauthorized("Invalid or expired token");
        }
    };

    // Attach context
    req.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        username: claims.username,
        roles: claims.roles,
    });

    next.run(req).await
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string(), code: "unauthorized" });
    (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(roles: &[&str]) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            username: "someone".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }

    #[test]
    fn staff_roles() {
        assert!(ctx(&["Admin"]).require_staff().is_ok());
        assert!(ctx(&["manager"]).require_staff().is_ok());
        assert!(ctx(&[]).require_staff().is_err());
    }

    #[test]
    fn admin_only() {
        assert!(ctx(&["Admin", "Manager"]).require_admin().is_ok());
        let err = ctx(&["Manager"]).require_admin().unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
