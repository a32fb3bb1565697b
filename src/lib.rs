use spin_sdk::http::{Request, Response};

pub mod accounts;
pub mod auth;
pub mod config;
pub mod core;
pub mod follow;
pub mod models;
pub mod token;

#[cfg(target_arch = "wasm32")]
use crate::core::helpers::store;

/// Map verbs and paths onto the core operations. Shared by the Spin
/// component entrypoint and the native adapter binary.
pub fn route(req: Request) -> anyhow::Result<Response> {
    let path = req.path().to_string();
    let method = req.method().to_string();

    match (method.as_str(), path.as_str()) {
        ("POST", "/accounts") => accounts::create_account(req),
        ("POST", "/login") => auth::login_user(req),
        ("GET", "/accounts") => accounts::list_accounts(),
        ("GET", "/profile") => accounts::get_profile(req),
        ("POST", p) if p.starts_with("/accounts/") && p.ends_with("/follow") => follow::handle_follow(req),
        ("POST", p) if p.starts_with("/accounts/") && p.ends_with("/unfollow") => follow::handle_unfollow(req),
        ("GET", p) if p.starts_with("/accounts/") && p.len() > 10 => accounts::get_account_details(p),
        ("PUT", p) if p.starts_with("/accounts/") && p.len() > 10 => accounts::update_account(req),
        ("DELETE", p) if p.starts_with("/accounts/") && p.len() > 10 => accounts::delete_account(req),
        _ => Ok(Response::builder().status(404).body("Not found").build()),
    }
}

// === Component entrypoint ===
#[cfg(target_arch = "wasm32")]
#[spin_sdk::http_component]
fn handle(req: Request) -> anyhow::Result<impl spin_sdk::http::IntoResponse> {
    let _ = core::db::seed_demo_data(&store()); // Seed demo data on first request

    route(req)
}
