use spin_sdk::http::{Request, Response};
use spin_sdk::key_value::Store;
use uuid::Uuid;

use crate::auth::{authenticate, require_owner};
use crate::config::*;
use crate::core::errors::ApiError;
use crate::core::helpers::{hash_password, normalize_email, now_iso, sanitize_text, store, validate_uuid};
use crate::models::models::{Account, AccountProfile};
use crate::token;

/// Validate a signup draft and build the account record. The password is
/// hashed here, exactly once; nothing downstream ever sees the plaintext.
pub fn new_account(name: &str, email: &str, password: &str) -> Result<Account, ApiError> {
    let name = sanitize_text(name.trim());
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest("Name too long (max 100 chars)".to_string()));
    }

    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest("Password must be at least 6 characters".to_string()));
    }

    let now = now_iso();
    Ok(Account {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        password: hash_password(password)?,
        bio: String::new(),
        profile_picture: DEFAULT_PROFILE_PICTURE.to_string(),
        website: None,
        location: None,
        is_private: false,
        followers: Vec::new(),
        following: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Apply a profile patch. Only the whitelisted fields below are honored;
/// any other key in the patch document is silently ignored.
pub fn apply_patch(account: &mut Account, patch: &serde_json::Value) -> Result<(), ApiError> {
    if let Some(name) = patch["name"].as_str() {
        let name = sanitize_text(name.trim());
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name is required".to_string()));
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(ApiError::BadRequest("Name too long (max 100 chars)".to_string()));
        }
        account.name = name;
    }

    if let Some(bio) = patch["bio"].as_str() {
        if bio.len() > MAX_BIO_LENGTH {
            return Err(ApiError::BadRequest("Bio too long (max 500 chars)".to_string()));
        }
        account.bio = sanitize_text(bio);
    }

    if let Some(picture) = patch["profile_picture"].as_str() {
        account.profile_picture = picture.to_string();
    }

    if let Some(website) = patch["website"].as_str() {
        let website = website.trim();
        account.website = if website.is_empty() { None } else { Some(website.to_string()) };
    }

    if let Some(location) = patch["location"].as_str() {
        let location = location.trim();
        account.location = if location.is_empty() { None } else { Some(location.to_string()) };
    }

    if let Some(private) = patch["is_private"].as_bool() {
        account.is_private = private;
    }

    if let Some(password) = patch["password"].as_str() {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::BadRequest("Password must be at least 6 characters".to_string()));
        }
        account.password = hash_password(password)?;
    }

    account.updated_at = now_iso();
    Ok(())
}

pub fn find_account(store: &Store, id: &str) -> anyhow::Result<Option<Account>> {
    Ok(store.get_json::<Account>(&account_key(id))?)
}

pub fn find_by_email(store: &Store, email: &str) -> anyhow::Result<Option<Account>> {
    let wanted = normalize_email(email);
    let ids: Vec<String> = store.get_json(ACCOUNTS_LIST_KEY)?.unwrap_or_default();

    for id in ids {
        if let Some(account) = find_account(store, &id)? {
            if account.email == wanted {
                return Ok(Some(account));
            }
        }
    }

    Ok(None)
}

/// All accounts, newest first. The id index keeps creation order with
/// the newest at the end.
pub fn list_all(store: &Store) -> anyhow::Result<Vec<Account>> {
    let ids: Vec<String> = store.get_json(ACCOUNTS_LIST_KEY)?.unwrap_or_default();
    let mut accounts = Vec::new();

    for id in ids.iter().rev() {
        if let Some(account) = find_account(store, id)? {
            accounts.push(account);
        }
    }

    Ok(accounts)
}

pub fn insert_account(store: &Store, account: &Account) -> anyhow::Result<()> {
    store.set_json(&account_key(&account.id), account)?;

    let mut ids: Vec<String> = store.get_json(ACCOUNTS_LIST_KEY)?.unwrap_or_default();
    ids.push(account.id.clone());
    store.set_json(ACCOUNTS_LIST_KEY, &ids)?;

    Ok(())
}

// === HTTP Handlers ===

pub fn create_account(req: Request) -> anyhow::Result<Response> {
    let store = store();

    let body: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::BadRequest("Invalid JSON body".to_string()).into()),
    };
    let name = body["name"].as_str().unwrap_or("");
    let email = body["email"].as_str().unwrap_or("");
    let password = body["password"].as_str().unwrap_or("");

    let account = match new_account(name, email, password) {
        Ok(account) => account,
        Err(e) => return Ok(e.into()),
    };

    if find_by_email(&store, &account.email)?.is_some() {
        return Ok(ApiError::BadRequest("Email already registered".to_string()).into());
    }

    insert_account(&store, &account)?;

    let mut resp = serde_json::to_value(AccountProfile::from(&account))?;
    resp["token"] = serde_json::Value::String(token::issue(&account.id)?);

    Ok(Response::builder()
        .status(201)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&resp)?)
        .build())
}

pub fn list_accounts() -> anyhow::Result<Response> {
    let store = store();
    let profiles: Vec<AccountProfile> = list_all(&store)?.iter().map(AccountProfile::from).collect();

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&profiles)?)
        .build())
}

pub fn get_profile(req: Request) -> anyhow::Result<Response> {
    let account = match authenticate(&req) {
        Ok(account) => account,
        Err(e) => return Ok(e.into()),
    };

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&AccountProfile::from(&account))?)
        .build())
}

pub fn get_account_details(path: &str) -> anyhow::Result<Response> {
    let account_id = path.trim_start_matches("/accounts/");

    if account_id.is_empty() || !validate_uuid(account_id) {
        return Ok(ApiError::BadRequest("Account ID required".to_string()).into());
    }

    let store = store();
    if let Some(account) = find_account(&store, account_id)? {
        Ok(Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&AccountProfile::from(&account))?)
            .build())
    } else {
        Ok(ApiError::NotFound("Account not found".to_string()).into())
    }
}

pub fn update_account(req: Request) -> anyhow::Result<Response> {
    let actor = match authenticate(&req) {
        Ok(account) => account,
        Err(e) => return Ok(e.into()),
    };

    let account_id = req.path().trim_start_matches("/accounts/").to_string();
    if account_id.is_empty() || !validate_uuid(&account_id) {
        return Ok(ApiError::BadRequest("Account ID required".to_string()).into());
    }

    let store = store();
    if let Some(mut account) = find_account(&store, &account_id)? {
        if let Err(e) = require_owner(&actor, &account.id) {
            return Ok(e.into());
        }

        let patch: serde_json::Value = match serde_json::from_slice(req.body()) {
            Ok(v) => v,
            Err(_) => return Ok(ApiError::BadRequest("Invalid JSON body".to_string()).into()),
        };

        if let Err(e) = apply_patch(&mut account, &patch) {
            return Ok(e.into());
        }

        store.set_json(&account_key(&account.id), &account)?;

        Ok(Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&AccountProfile::from(&account))?)
            .build())
    } else {
        Ok(ApiError::NotFound("Account not found".to_string()).into())
    }
}

pub fn delete_account(req: Request) -> anyhow::Result<Response> {
    let actor = match authenticate(&req) {
        Ok(account) => account,
        Err(e) => return Ok(e.into()),
    };

    let account_id = req.path().trim_start_matches("/accounts/").to_string();
    if account_id.is_empty() || !validate_uuid(&account_id) {
        return Ok(ApiError::BadRequest("Account ID required".to_string()).into());
    }

    let store = store();
    if find_account(&store, &account_id)?.is_none() {
        return Ok(ApiError::NotFound("Account not found".to_string()).into());
    }
    if let Err(e) = require_owner(&actor, &account_id) {
        return Ok(e.into());
    }

    let ids: Vec<String> = store.get_json(ACCOUNTS_LIST_KEY)?.unwrap_or_default();

    // Scrub the deleted id from every other account's relationship sets
    // so no follower/following entry dangles.
    for other_id in &ids {
        if other_id == &account_id {
            continue;
        }
        if let Some(mut other) = find_account(&store, other_id)? {
            let before = other.followers.len() + other.following.len();
            other.followers.retain(|id| id != &account_id);
            other.following.retain(|id| id != &account_id);
            if other.followers.len() + other.following.len() != before {
                store.set_json(&account_key(other_id), &other)?;
            }
        }
    }

    store.delete(&account_key(&account_id))?;

    let ids: Vec<String> = ids.into_iter().filter(|id| id != &account_id).collect();
    store.set_json(ACCOUNTS_LIST_KEY, &ids)?;

    Ok(Response::builder().status(204).body("").build())
}
