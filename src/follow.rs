use spin_sdk::http::{Request, Response};
use spin_sdk::key_value::Store;

use crate::accounts::find_account;
use crate::auth::authenticate;
use crate::config::account_key;
use crate::core::errors::ApiError;
use crate::core::helpers::{store, validate_uuid};
use crate::models::models::Account;

/// Mirror a follow across both account documents. Returns false when the
/// relationship already fully exists (idempotent no-op). A one-sided
/// entry left behind by an interrupted write gets repaired here.
pub fn link(actor: &mut Account, target: &mut Account) -> bool {
    let mut changed = false;

    if !actor.following.contains(&target.id) {
        actor.following.push(target.id.clone());
        changed = true;
    }
    if !target.followers.contains(&actor.id) {
        target.followers.push(actor.id.clone());
        changed = true;
    }

    changed
}

/// Remove the mirrored entries from both sides. Returns false when no
/// relationship existed on either side.
pub fn unlink(actor: &mut Account, target: &mut Account) -> bool {
    let linked = actor.following.contains(&target.id) || target.followers.contains(&actor.id);

    actor.following.retain(|id| id != &target.id);
    target.followers.retain(|id| id != &actor.id);

    linked
}

pub fn follow_account(store: &Store, actor: &mut Account, target_id: &str) -> Result<usize, ApiError> {
    if actor.id == target_id {
        return Err(ApiError::BadRequest("You cannot follow yourself".to_string()));
    }

    let mut target = match find_account(store, target_id)? {
        Some(target) => target,
        None => return Err(ApiError::NotFound("Target account not found".to_string())),
    };

    if link(actor, &mut target) {
        // Two documents, no transaction: the actor document goes first, so
        // an interrupted write leaves the claim on the actor side only,
        // where the next follow/unfollow for the pair repairs it.
        store
            .set_json(&account_key(&actor.id), actor)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        store
            .set_json(&account_key(&target.id), &target)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
    }

    Ok(actor.following.len())
}

pub fn unfollow_account(store: &Store, actor: &mut Account, target_id: &str) -> Result<usize, ApiError> {
    if actor.id == target_id {
        return Err(ApiError::BadRequest("You cannot unfollow yourself".to_string()));
    }

    let mut target = match find_account(store, target_id)? {
        Some(target) => target,
        None => return Err(ApiError::NotFound("Target account not found".to_string())),
    };

    if unlink(actor, &mut target) {
        store
            .set_json(&account_key(&actor.id), actor)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        store
            .set_json(&account_key(&target.id), &target)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
    }

    Ok(actor.following.len())
}

// === HTTP Handlers ===

// Routes look like /accounts/{id}/follow and /accounts/{id}/unfollow.
fn path_account_id(path: &str) -> &str {
    path.split('/').nth(2).unwrap_or("")
}

pub fn handle_follow(req: Request) -> anyhow::Result<Response> {
    let mut actor = match authenticate(&req) {
        Ok(account) => account,
        Err(e) => return Ok(e.into()),
    };

    let target_id = path_account_id(req.path()).to_string();
    if target_id.is_empty() || !validate_uuid(&target_id) {
        return Ok(ApiError::BadRequest("Account ID required".to_string()).into());
    }

    let store = store();
    match follow_account(&store, &mut actor, &target_id) {
        Ok(count) => Ok(Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&serde_json::json!({
                "status": "followed",
                "following_count": count
            }))?)
            .build()),
        Err(e) => Ok(e.into()),
    }
}

pub fn handle_unfollow(req: Request) -> anyhow::Result<Response> {
    let mut actor = match authenticate(&req) {
        Ok(account) => account,
        Err(e) => return Ok(e.into()),
    };

    let target_id = path_account_id(req.path()).to_string();
    if target_id.is_empty() || !validate_uuid(&target_id) {
        return Ok(ApiError::BadRequest("Account ID required".to_string()).into());
    }

    let store = store();
    match unfollow_account(&store, &mut actor, &target_id) {
        Ok(count) => Ok(Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&serde_json::json!({
                "status": "unfollowed",
                "following_count": count
            }))?)
            .build()),
        Err(e) => Ok(e.into()),
    }
}
