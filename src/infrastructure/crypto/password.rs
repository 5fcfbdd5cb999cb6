//! Password hashing utilities

use bcrypt::{hash, verify};

/// bcrypt cost factor used for every stored password
pub const PASSWORD_HASH_COST: u32 = 10;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, PASSWORD_HASH_COST)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hashed = hash_password(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hashed.starts_with("$2b$10$"));
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let first = hash_password("password1").unwrap();
        let second = hash_password("password1").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("password1", &second).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("password1", "not-a-bcrypt-hash").is_err());
    }
}
