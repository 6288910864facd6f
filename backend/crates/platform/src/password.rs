//! Password Hashing and Verification
//!
//! Argon2id hashing (memory-hard, recommended by OWASP) with basic
//! length policy checks. Hashes are stored in PHC string format, so
//! parameters can be tightened later without invalidating old hashes.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Validate a raw password against the length policy
pub fn validate_password(raw: &str) -> Result<(), PasswordPolicyError> {
    if raw.trim().is_empty() {
        return Err(PasswordPolicyError::EmptyOrWhitespace);
    }

    let len = raw.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: len,
        });
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooLong {
            max: MAX_PASSWORD_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Hash a password with Argon2id and a fresh random salt
pub fn hash_password(raw: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))
}

/// Verify a password against a stored PHC-format hash
///
/// Returns `Ok(false)` on mismatch; `Err` only for malformed hashes.
pub fn verify_password(raw: &str, stored: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(stored).map_err(|_| PasswordHashError::InvalidHashFormat)?;

    Ok(Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("correct horse battery").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(PasswordPolicyError::TooShort { .. })
        ));
        assert!(matches!(
            validate_password("        "),
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(matches!(
            validate_password(&long),
            Err(PasswordPolicyError::TooLong { .. })
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("my secure password").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("my secure password", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("whatever", "not-a-phc-string"),
            Err(PasswordHashError::InvalidHashFormat)
        ));
    }
}
