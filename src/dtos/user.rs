// src/dtos/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dtos::is_valid_email;
use crate::error::AppError;
use crate::models::user::User;

#[derive(Deserialize)]
pub struct UserLogin {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AppError::validation("Username required"));
        }
        if username.len() > 64 {
            return Err(AppError::validation("Username must be at most 64 characters"));
        }
        if self.password.len() < 6 {
            return Err(AppError::validation("Password too short"));
        }
        if !is_valid_email(&self.email) {
            return Err(AppError::validation("A valid email is required"));
        }
        if self.name.chars().count() > 128 {
            return Err(AppError::validation("Name must be at most 128 characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub phone: String,
    pub address: String,
    pub roles: Vec<String>,
}

impl UserDto {
    pub fn from_parts(user: User, roles: Vec<String>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            phone: user.phone,
            address: user.address,
            roles,
        }
    }
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> RegisterUserRequest {
        RegisterUserRequest {
            name: "Manager".into(),
            email: "manager@store.vn".into(),
            username: "manager".into(),
            password: "secret1".into(),
            phone: String::new(),
            address: String::new(),
            roles: vec!["Manager".into()],
        }
    }

    #[test]
    fn register_validation() {
        assert!(register().validate().is_ok());

        let mut r = register();
        r.password = "12345".into();
        assert!(r.validate().is_err());

        let mut r = register();
        r.username = "  ".into();
        assert!(r.validate().is_err());

        let mut r = register();
        r.email = "manager".into();
        assert!(r.validate().is_err());
    }

    #[test]
    fn user_dto_never_exposes_the_password() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Admin".into(),
            email: "Admin@gmail.com".into(),
            username: "admin".into(),
            password: "$2b$12$hash".into(),
            phone: String::new(),
            address: String::new(),
        };
        let json = serde_json::to_string(&UserDto::from_parts(user, vec!["Admin".into()])).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("$2b$"));
    }
}
