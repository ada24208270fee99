//! Session tokens: JWT access tokens plus opaque id generation

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,    // expiry timestamp
    pub iat: i64,    // issued at
}

#[derive(Debug)]
pub enum TokenError {
    Invalid,
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "Invalid token"),
            TokenError::Expired => write!(f, "Token expired"),
        }
    }
}

/// Sessions live in process memory, so the access token covers the whole
/// session lifetime rather than pairing a short expiry with refresh rotation.
const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 12;

/// Create a JWT access token bound to the given user id
pub fn create_access_token(user_id: &str, secret: &[u8]) -> Result<String, TokenError> {
    let now = Utc::now();
    let exp = now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS);

    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|_| TokenError::Invalid)
}

/// Validate a JWT access token and return the user id
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<String, TokenError> {
    // Pin HS256 to prevent algorithm confusion attacks
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub", "iat"]);

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

    Ok(token_data.claims.sub)
}

/// Generate a random opaque id (hex of 16 random bytes)
pub fn generate_opaque_id() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes.as_slice())
}

// Hex encoding helper since we don't want to add another dependency
mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: &[u8]) -> String {
        let mut result = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_roundtrip() {
        let secret = b"test-secret";
        let token = create_access_token("u-42", secret).expect("create");
        let sub = validate_access_token(&token, secret).expect("validate");
        assert_eq!(sub, "u-42");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_access_token("u-42", b"secret-a").expect("create");
        assert!(matches!(
            validate_access_token(&token, b"secret-b"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_opaque_ids_are_hex_and_unique() {
        let a = generate_opaque_id();
        let b = generate_opaque_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
