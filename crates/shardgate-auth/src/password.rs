//! Password policy and Argon2 hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{AuthError, Result};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Check a plaintext password against the registration policy.
///
/// # Errors
///
/// Returns `PasswordRequired` for an empty password and `PasswordTooShort`
/// for one under [`MIN_PASSWORD_LEN`] characters.
pub fn check_policy(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AuthError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

/// Hash a password with a fresh random salt, returning a PHC string.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if Argon2 fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored PHC hash.
///
/// An unparseable stored hash never verifies.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_boundaries() {
        assert!(matches!(check_policy(""), Err(AuthError::PasswordRequired)));
        assert!(matches!(check_policy("abc"), Err(AuthError::PasswordTooShort)));
        assert!(matches!(check_policy("abcde"), Err(AuthError::PasswordTooShort)));
        assert!(check_policy("abcdef").is_ok());
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn salts_differ() {
        let a = hash_password("abcdef").unwrap();
        let b = hash_password("abcdef").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("abcdef", "not-a-hash"));
    }
}
