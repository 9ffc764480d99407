// src/models/user.rs
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_MANAGER: &str = "Manager";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    /// bcrypt hash, never the plaintext.
    pub password: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}
