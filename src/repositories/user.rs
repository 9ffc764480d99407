// src/repositories/user.rs
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::password::verify_password;
use crate::dtos::user::RegisterUserRequest;
use crate::error::{map_unique_violation, AppError};
use crate::models::user::{Role, User};

const USER_COLUMNS: &str = "id, name, email, username, password, phone, address";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// The user with `username` whose password matches, or `None`. Unknown
    /// user and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn get_user(&self, username: &str, password: &str) -> Result<Option<User>, AppError> {
        let user = self.find_by_username(username).await?;
        check_credentials(user, password)
    }

    pub async fn get_roles(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM roles r
             JOIN user_in_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.name"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    pub async fn is_user_existed(&self, username: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username.trim())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Inserts the user with an already-hashed password and links the named
    /// roles, which must exist.
    #[instrument(skip(self, req, password_hash), fields(username = %req.username))]
    pub async fn register(&self, req: &RegisterUserRequest, password_hash: &str) -> Result<(User, Vec<String>), AppError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, username, password, phone, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(req.email.trim())
        .bind(req.username.trim())
        .bind(password_hash)
        .bind(req.phone.trim())
        .bind(req.address.trim())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "Username already exists"))?;

        let mut roles = Vec::with_capacity(req.roles.len());
        for name in &req.roles {
            let role = find_role(&mut *tx, name)
                .await?
                .ok_or_else(|| AppError::validation(format!("Unknown role '{name}'")))?;
            sqlx::query("INSERT INTO user_in_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(user.id)
                .bind(role.id)
                .execute(&mut *tx)
                .await?;
            if !roles.contains(&role.name) {
                roles.push(role.name);
            }
        }

        tx.commit().await?;
        roles.sort();

        info!(id = %user.id, "Registered user");
        Ok((user, roles))
    }
}

/// Keeps `user` only when `password` matches its stored hash.
fn check_credentials(user: Option<User>, password: &str) -> Result<Option<User>, AppError> {
    match user {
        Some(user) if verify_password(password, &user.password)? => Ok(Some(user)),
        _ => Ok(None),
    }
}

async fn find_role(conn: &mut PgConnection, name: &str) -> Result<Option<Role>, AppError> {
    let role = sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE LOWER(name) = LOWER($1)")
        .bind(name.trim())
        .fetch_optional(conn)
        .await?;
    Ok(role)
}
