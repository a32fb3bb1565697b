use spin_sdk::http::{Request, Response};

use crate::accounts::{find_account, find_by_email};
use crate::core::errors::ApiError;
use crate::core::helpers::{store, verify_password};
use crate::core::query_params::{get_string, parse_query_params};
use crate::models::models::Account;
use crate::token;

pub fn login_user(req: Request) -> anyhow::Result<Response> {
    let store = store();

    let creds: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::BadRequest("Invalid JSON body".to_string()).into()),
    };
    let email = creds["email"].as_str().unwrap_or_default();
    let password = creds["password"].as_str().unwrap_or_default();

    if let Some(account) = find_by_email(&store, email)? {
        if verify_password(password, &account.password) {
            let resp = serde_json::json!({
                "token": token::issue(&account.id)?,
                "account_id": account.id
            });
            return Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(serde_json::to_vec(&resp)?)
                .build());
        }
    }

    // Same answer for an unknown email and a wrong password.
    Ok(ApiError::BadRequest("Invalid email or password".to_string()).into())
}

/// Pull the bearer token out of a request. The Authorization header is
/// preferred; a `token` query parameter is accepted for clients that
/// cannot set headers.
pub fn bearer_token(req: &Request) -> Option<String> {
    if let Some(header) = req.header("Authorization").and_then(|h| h.as_str()) {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let params = parse_query_params(req.uri());
    get_string(&params, "token", None)
}

/// Resolve the requesting account. A missing, malformed, or expired token
/// and a token for a since-deleted account all collapse to Unauthorized;
/// the live lookup is the only defense against tokens issued before an
/// account was deleted.
pub fn authenticate(req: &Request) -> Result<Account, ApiError> {
    let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
    let account_id = token::validate(&token).map_err(|_| ApiError::Unauthorized)?;

    let store = store();
    match find_account(&store, &account_id) {
        Ok(Some(account)) => Ok(account),
        Ok(None) => Err(ApiError::Unauthorized),
        Err(e) => Err(ApiError::InternalError(e.to_string())),
    }
}

/// Owner-only mutation rule: the authenticated identity must be the
/// target resource.
pub fn require_owner(actor: &Account, target_id: &str) -> Result<(), ApiError> {
    if actor.id == target_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::new_account;

    #[test]
    fn owner_check_rejects_other_accounts() {
        let ava = new_account("Ava", "ava@x.com", "secret1").unwrap();
        let bob = new_account("Bob", "bob@x.com", "secret1").unwrap();

        assert!(require_owner(&ava, &ava.id).is_ok());
        assert!(matches!(require_owner(&ava, &bob.id), Err(ApiError::Forbidden)));
    }
}
