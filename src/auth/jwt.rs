// src/auth/jwt.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Serialize, Deserialize};
use uuid::Uuid;
use crate::error::AppError;
use crate::models::user::User;

pub const TOKEN_LIFETIME_DAYS: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn sign_token(user: &User, roles: &[String], secret: &str) -> Result<SignedToken, AppError> {
    sign_token_at(user, roles, secret, Utc::now())
}

fn sign_token_at(user: &User, roles: &[String], secret: &str, now: DateTime<Utc>) -> Result<SignedToken, AppError> {
    let exp = now + Duration::days(TOKEN_LIFETIME_DAYS);
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        roles: roles.to_vec(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };
    let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))?;

    // Report the second-truncated expiry that is actually in the token.
    let expires_at = Utc
        .timestamp_opt(exp.timestamp(), 0)
        .single()
        .unwrap_or(exp);

    Ok(SignedToken { token, expires_at })
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256)
    )
    .map(|d| d.claims)
    .map_err(|e| AppError::unauthorized(format!("Invalid or expired token: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Admin".into(),
            email: "Admin@gmail.com".into(),
            username: "admin".into(),
            password: "hash".into(),
            phone: "0123456789".into(),
            address: "DLU".into(),
        }
    }

    #[test]
    fn token_carries_identity_claims() {
        let u = user();
        let roles = vec!["Admin".to_string(), "Manager".to_string()];
        let signed = sign_token(&u, &roles, "secret").unwrap();
        let claims = verify_token(&signed.token, "secret").unwrap();

        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.email, "Admin@gmail.com");
        assert_eq!(claims.name, "Admin");
        assert_eq!(claims.roles, roles);
    }

    #[test]
    fn token_expires_after_fifteen_days() {
        let now = Utc::now();
        let signed = sign_token_at(&user(), &[], "secret", now).unwrap();
        let claims = verify_token(&signed.token, "secret").unwrap();

        assert_eq!(claims.exp - claims.iat, 15 * 24 * 60 * 60);
        assert_eq!(signed.expires_at.timestamp() as usize, claims.exp);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signed = sign_token(&user(), &[], "secret").unwrap();
        let err = verify_token(&signed.token, "other").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::days(TOKEN_LIFETIME_DAYS + 1);
        let signed = sign_token_at(&user(), &[], "secret", issued).unwrap();
        assert!(verify_token(&signed.token, "secret").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_token("not.a.jwt", "secret").is_err());
    }
}
