use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use jsonwebtoken::errors::ErrorKind;
use serde::{Serialize, Deserialize};

use crate::config::{token_expiration_hours, token_secret};

#[derive(Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Invalid,
    Expired,
}

/// Issue a signed session token for an account. Tokens are stateless:
/// nothing is recorded server-side, and a token stays valid until its
/// expiry regardless of what happens to the account afterwards.
pub fn issue(account_id: &str) -> anyhow::Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: account_id.to_string(),
        iat: now,
        exp: now + token_expiration_hours() * 3600,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(token_secret().as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
}

/// Verify a token's signature and expiry, returning the account id it
/// was issued for.
pub fn validate(token: &str) -> Result<String, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(token_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    Ok(data.claims.sub)
}
