use spin_sdk::key_value::Store;
use tracing::info;

use crate::accounts::{find_by_email, insert_account, new_account};
use crate::config::account_key;
use crate::follow::link;
use crate::models::models::Account;

fn ensure_account(store: &Store, name: &str, email: &str, password: &str, bio: &str) -> anyhow::Result<Account> {
    if let Some(account) = find_by_email(store, email)? {
        return Ok(account);
    }

    let mut account = new_account(name, email, password)?;
    account.bio = bio.to_string();
    insert_account(store, &account)?;

    Ok(account)
}

/// Seed a few demo accounts through the same path signup uses, so every
/// store invariant holds for them. Safe to call on every request.
pub fn seed_demo_data(store: &Store) -> anyhow::Result<()> {
    let ava_seeded = find_by_email(store, "ava@flock.dev")?.is_some();
    let bob_seeded = find_by_email(store, "bob@flock.dev")?.is_some();
    let cleo_seeded = find_by_email(store, "cleo@flock.dev")?.is_some();

    if ava_seeded && bob_seeded && cleo_seeded {
        return Ok(()); // Already seeded
    }

    let mut ava = ensure_account(store, "Ava", "ava@flock.dev", "avapass", "First bird in the flock")?;
    let mut bob = ensure_account(store, "Bob", "bob@flock.dev", "bobpass", "Bob's corner of the internet")?;
    ensure_account(store, "Cleo", "cleo@flock.dev", "cleopass", "Mostly lurking")?;

    // One pre-established relationship, mirrored on both documents.
    if link(&mut ava, &mut bob) {
        store.set_json(&account_key(&ava.id), &ava)?;
        store.set_json(&account_key(&bob.id), &bob)?;
    }

    info!("Seeded demo accounts");
    Ok(())
}
