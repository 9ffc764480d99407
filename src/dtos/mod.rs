// src/dtos/mod.rs
pub mod category;
pub mod dashboard;
pub mod discount;
pub mod order;
pub mod paging;
pub mod product;
pub mod user;

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("2014478@gmail.com"));
        assert!(is_valid_email(" Admin@gmail.com "));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("@gmail.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b..com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }
}
