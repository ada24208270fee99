//! Argon2id password hashing and verification
//!
//! Hashes are stored in PHC string format so the algorithm parameters and
//! salt travel with the hash.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plaintext password with Argon2id and a fresh random salt
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
/// `Ok(false)` means the password simply did not match.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reject passwords below the minimum length, with a user-facing message
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_verifies() {
        let hash = hash_password("uma-senha-bem-longa").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("uma-senha-bem-longa", &hash).expect("verify"));
    }

    #[test]
    fn test_mismatch_is_false_not_error() {
        let hash = hash_password("senha-correta").expect("hash");
        assert!(!verify_password("senha-errada", &hash).expect("verify"));
    }

    #[test]
    fn test_strength_minimum() {
        assert!(validate_password_strength("curta").is_err());
        assert!(validate_password_strength("12345678").is_ok());
    }
}
