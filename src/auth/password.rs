// src/auth/password.rs
use bcrypt::{hash, verify, DEFAULT_COST};
use crate::error::AppError;

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    hash_password_with_cost(plain, DEFAULT_COST)
}

pub fn hash_password_with_cost(plain: &str, cost: u32) -> Result<String, AppError> {
    hash(plain, cost).map_err(|e| AppError::internal(format!("Hash error: {e}")))
}

pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, AppError> {
    verify(plain, hashed).map_err(|e| AppError::internal(format!("Password verify error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn correct_password_verifies() {
        let hashed = hash_password_with_cost("admin123", TEST_COST).unwrap();
        assert_ne!(hashed, "admin123");
        assert!(verify_password("admin123", &hashed).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hashed = hash_password_with_cost("admin123", TEST_COST).unwrap();
        assert!(!verify_password("admin124", &hashed).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_internal_error() {
        let err = verify_password("admin123", "plaintext").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
