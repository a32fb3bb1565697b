// End-to-end tests against a running server (`spin up`, default port).
// They are ignored by default so `cargo test` passes without one:
//
//   cargo test --test integration -- --ignored

use serde_json::json;
use std::sync::Mutex;

const BASE_URL: &str = "http://127.0.0.1:3000";
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn lock_test() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap()
}

async fn signup(client: &reqwest::Client, name: &str, email: &str, password: &str) -> (String, String) {
    let resp = client
        .post(&format!("{}/accounts", BASE_URL))
        .json(&json!({ "name": name, "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to create account");

    assert_eq!(resp.status(), 201);
    let account = resp.json::<serde_json::Value>().await.unwrap();
    assert!(account.get("password").is_none(), "Password leaked in signup response: {:?}", account);
    assert!(account.get("token").is_some(), "Token missing in signup response: {:?}", account);

    (
        account["id"].as_str().unwrap().to_string(),
        account["token"].as_str().unwrap().to_string(),
    )
}

fn unique_email(prefix: &str) -> String {
    format!("{}_{}@flock.test", prefix, uuid::Uuid::new_v4())
}

#[ignore]
#[tokio::test]
async fn test_full_account_flow() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    // 1. Sign up
    let email = unique_email("flow");
    let (account_id, _) = signup(&client, "Ava Flow", &email, "secret1").await;

    // 2. Login
    let login_resp = client
        .post(&format!("{}/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(login_resp.status(), 200);
    let token_data = login_resp.json::<serde_json::Value>().await.unwrap();
    assert_eq!(token_data["account_id"], account_id.as_str());
    let token = token_data["token"].as_str().unwrap().to_string();

    // Wrong password is a 400, not a 401
    let bad_login = client
        .post(&format!("{}/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_login.status(), 400);

    // 3. Own profile
    let profile_resp = client
        .get(&format!("{}/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(profile_resp.status(), 200);
    let profile = profile_resp.json::<serde_json::Value>().await.unwrap();
    assert_eq!(profile["id"], account_id.as_str());
    assert!(profile.get("password").is_none());

    // Token via query parameter works too
    let query_resp = client
        .get(&format!("{}/profile?token={}", BASE_URL, token))
        .send()
        .await
        .unwrap();
    assert_eq!(query_resp.status(), 200);

    // 4. Update profile
    let update_resp = client
        .put(&format!("{}/accounts/{}", BASE_URL, account_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "bio": "Hello from the integration test", "is_private": true, "ignored_field": 42 }))
        .send()
        .await
        .unwrap();

    assert_eq!(update_resp.status(), 200);
    let updated = update_resp.json::<serde_json::Value>().await.unwrap();
    assert_eq!(updated["bio"], "Hello from the integration test");
    assert_eq!(updated["is_private"], true);

    // 5. Public lookups
    let get_resp = client
        .get(&format!("{}/accounts/{}", BASE_URL, account_id))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 200);

    let list_resp = client.get(&format!("{}/accounts", BASE_URL)).send().await.unwrap();
    assert_eq!(list_resp.status(), 200);
    let accounts = list_resp.json::<Vec<serde_json::Value>>().await.unwrap();
    assert!(accounts.iter().any(|a| a["id"] == account_id.as_str()));
    assert!(accounts.iter().all(|a| a.get("password").is_none()));
}

#[ignore]
#[tokio::test]
async fn test_duplicate_email_rejected() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let email = unique_email("dup");
    signup(&client, "First", &email, "secret1").await;

    // Same email, different case
    let resp = client
        .post(&format!("{}/accounts", BASE_URL))
        .json(&json!({ "name": "Second", "email": email.to_uppercase(), "password": "secret1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[ignore]
#[tokio::test]
async fn test_auth_required() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let resp = client.get(&format!("{}/profile", BASE_URL)).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(&format!("{}/profile", BASE_URL))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[ignore]
#[tokio::test]
async fn test_ownership_enforced() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let (_, ava_token) = signup(&client, "Ava", &unique_email("ava"), "secret1").await;
    let (bob_id, _) = signup(&client, "Bob", &unique_email("bob"), "secret1").await;

    let resp = client
        .put(&format!("{}/accounts/{}", BASE_URL, bob_id))
        .header("Authorization", format!("Bearer {}", ava_token))
        .json(&json!({ "bio": "defaced" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = client
        .delete(&format!("{}/accounts/{}", BASE_URL, bob_id))
        .header("Authorization", format!("Bearer {}", ava_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Bob is untouched
    let resp = client
        .get(&format!("{}/accounts/{}", BASE_URL, bob_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let bob = resp.json::<serde_json::Value>().await.unwrap();
    assert_eq!(bob["bio"], "");
}

#[ignore]
#[tokio::test]
async fn test_follow_lifecycle() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let (ava_id, ava_token) = signup(&client, "Ava", &unique_email("ava"), "secret1").await;
    let (bob_id, _) = signup(&client, "Bob", &unique_email("bob"), "secret1").await;

    // Follow
    let resp = client
        .post(&format!("{}/accounts/{}/follow", BASE_URL, bob_id))
        .header("Authorization", format!("Bearer {}", ava_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["following_count"], 1);

    // Following twice is a no-op, not an error
    let resp = client
        .post(&format!("{}/accounts/{}/follow", BASE_URL, bob_id))
        .header("Authorization", format!("Bearer {}", ava_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["following_count"], 1);

    // Mirrored on both documents
    let ava = client
        .get(&format!("{}/accounts/{}", BASE_URL, ava_id))
        .send().await.unwrap()
        .json::<serde_json::Value>().await.unwrap();
    let bob = client
        .get(&format!("{}/accounts/{}", BASE_URL, bob_id))
        .send().await.unwrap()
        .json::<serde_json::Value>().await.unwrap();
    assert!(ava["following"].as_array().unwrap().iter().any(|id| id == bob_id.as_str()));
    assert!(bob["followers"].as_array().unwrap().iter().any(|id| id == ava_id.as_str()));

    // Self-follow is rejected
    let resp = client
        .post(&format!("{}/accounts/{}/follow", BASE_URL, ava_id))
        .header("Authorization", format!("Bearer {}", ava_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Unknown target is a 404
    let resp = client
        .post(&format!("{}/accounts/{}/follow", BASE_URL, uuid::Uuid::new_v4()))
        .header("Authorization", format!("Bearer {}", ava_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Unfollow clears both sides
    let resp = client
        .post(&format!("{}/accounts/{}/unfollow", BASE_URL, bob_id))
        .header("Authorization", format!("Bearer {}", ava_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["following_count"], 0);

    let ava = client
        .get(&format!("{}/accounts/{}", BASE_URL, ava_id))
        .send().await.unwrap()
        .json::<serde_json::Value>().await.unwrap();
    let bob = client
        .get(&format!("{}/accounts/{}", BASE_URL, bob_id))
        .send().await.unwrap()
        .json::<serde_json::Value>().await.unwrap();
    assert!(!ava["following"].as_array().unwrap().iter().any(|id| id == bob_id.as_str()));
    assert!(!bob["followers"].as_array().unwrap().iter().any(|id| id == ava_id.as_str()));
}

#[ignore]
#[tokio::test]
async fn test_delete_account_cleans_up() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let (ava_id, ava_token) = signup(&client, "Ava", &unique_email("ava"), "secret1").await;
    let email = unique_email("cleo");
    let (cleo_id, cleo_token) = signup(&client, "Cleo", &email, "secret1").await;

    // Ava follows Cleo, then Cleo deletes her account
    let resp = client
        .post(&format!("{}/accounts/{}/follow", BASE_URL, cleo_id))
        .header("Authorization", format!("Bearer {}", ava_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .delete(&format!("{}/accounts/{}", BASE_URL, cleo_id))
        .header("Authorization", format!("Bearer {}", cleo_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    // The account is gone, the credentials no longer work, and the
    // outstanding token fails the live-account check.
    let resp = client
        .get(&format!("{}/accounts/{}", BASE_URL, cleo_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(&format!("{}/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .get(&format!("{}/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", cleo_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // No dangling entry in Ava's following set
    let ava = client
        .get(&format!("{}/accounts/{}", BASE_URL, ava_id))
        .send().await.unwrap()
        .json::<serde_json::Value>().await.unwrap();
    assert!(!ava["following"].as_array().unwrap().iter().any(|id| id == cleo_id.as_str()));
}

#[ignore]
#[tokio::test]
async fn test_signup_validation() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    // Short password
    let resp = client
        .post(&format!("{}/accounts", BASE_URL))
        .json(&json!({ "name": "Ava", "email": unique_email("short"), "password": "abc12" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Missing name
    let resp = client
        .post(&format!("{}/accounts", BASE_URL))
        .json(&json!({ "email": unique_email("noname"), "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
