// Limits enforced by the account store.
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const DEFAULT_PROFILE_PICTURE: &str = "/img/default-avatar.png";

// Key-value layout: one document per account plus an id index.
pub const ACCOUNTS_LIST_KEY: &str = "accounts_list";

pub fn account_key(id: &str) -> String {
    format!("account:{}", id)
}

pub fn token_expiration_hours() -> i64 {
    std::env::var("FLOCK_TOKEN_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}

/// Signing secret for session tokens. The fallback is a development
/// convenience only; production deployments must set FLOCK_TOKEN_SECRET.
pub fn token_secret() -> String {
    match std::env::var("FLOCK_TOKEN_SECRET") {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            tracing::warn!("FLOCK_TOKEN_SECRET is not set, using insecure development secret");
            "flock-dev-secret-do-not-use-in-production".to_string()
        }
    }
}
