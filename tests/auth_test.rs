use chrono::{Duration, Utc};

use shipit::auth::{AuthStorage, StoredToken, forget_token, save_token};
use shipit::config::{Overrides, Resolved, Settings};

const API: &str = "https://shipit-api.example.com";

/// Helper: a database file in a fresh temp dir.
fn temp_db() -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shipit.db").to_str().unwrap().to_string();
    (path, dir)
}

// ── Storage CRUD ──────────────────────────────────────────────────

#[test]
fn get_returns_none_when_nothing_stored() {
    let (db, _dir) = temp_db();
    let storage = AuthStorage::open(&db).unwrap();
    assert!(storage.get(API).unwrap().is_none());
}

#[test]
fn save_and_read_back() {
    let (db, _dir) = temp_db();
    save_token(&db, API, "  tok-1\n", None).unwrap();

    let stored = AuthStorage::open(&db).unwrap().get(API).unwrap().unwrap();
    assert_eq!(stored.token, "tok-1");
    assert!(stored.expires_at.is_none());
}

#[test]
fn save_overwrites_previous_token() {
    let (db, _dir) = temp_db();
    save_token(&db, API, "old", None).unwrap();
    save_token(&db, API, "new", None).unwrap();

    let stored = AuthStorage::open(&db).unwrap().get(API).unwrap().unwrap();
    assert_eq!(stored.token, "new");
}

#[test]
fn empty_tokens_are_refused() {
    let (db, _dir) = temp_db();
    assert!(save_token(&db, API, "   ", None).is_err());
    assert!(AuthStorage::open(&db).unwrap().get(API).unwrap().is_none());
}

#[test]
fn forget_removes_only_that_api() {
    let (db, _dir) = temp_db();
    save_token(&db, API, "a", None).unwrap();
    save_token(&db, "https://other.example.com", "b", None).unwrap();

    forget_token(&db, API).unwrap();

    let storage = AuthStorage::open(&db).unwrap();
    assert!(storage.get(API).unwrap().is_none());
    assert!(storage.get("https://other.example.com").unwrap().is_some());
}

#[test]
fn forget_without_token_is_ok() {
    let (db, _dir) = temp_db();
    forget_token(&db, API).unwrap();
}

// ── Resolution ────────────────────────────────────────────────────

#[test]
fn resolve_prefers_unexpired_stored_token() {
    let (db, _dir) = temp_db();
    let storage = AuthStorage::open(&db).unwrap();
    storage
        .set(
            API,
            &StoredToken::new("stored", Some(Utc::now() + Duration::hours(1))),
        )
        .unwrap();

    assert_eq!(
        storage
            .resolve(API, "SHIPIT_TEST_TOKEN_UNSET_A")
            .unwrap()
            .as_deref(),
        Some("stored")
    );
}

#[test]
fn resolve_skips_expired_token() {
    let (db, _dir) = temp_db();
    let storage = AuthStorage::open(&db).unwrap();
    storage
        .set(
            API,
            &StoredToken::new("stale", Some(Utc::now() - Duration::minutes(1))),
        )
        .unwrap();

    assert!(
        storage
            .resolve(API, "SHIPIT_TEST_TOKEN_UNSET_B")
            .unwrap()
            .is_none()
    );
}

#[test]
fn resolve_falls_back_to_env_when_nothing_stored() {
    const VAR: &str = "SHIPIT_TEST_TOKEN_FALLBACK_EMPTY_STORE";
    unsafe { std::env::set_var(VAR, "from-env") };

    let (db, _dir) = temp_db();
    let storage = AuthStorage::open(&db).unwrap();
    assert_eq!(
        storage.resolve(API, VAR).unwrap().as_deref(),
        Some("from-env")
    );
}

#[test]
fn resolve_falls_back_to_env_when_stored_token_expired() {
    const VAR: &str = "SHIPIT_TEST_TOKEN_FALLBACK_EXPIRED";
    unsafe { std::env::set_var(VAR, "from-env") };

    let (db, _dir) = temp_db();
    let storage = AuthStorage::open(&db).unwrap();
    storage
        .set(
            API,
            &StoredToken::new("stale", Some(Utc::now() - Duration::minutes(1))),
        )
        .unwrap();

    assert_eq!(
        storage.resolve(API, VAR).unwrap().as_deref(),
        Some("from-env")
    );
}

#[test]
fn resolve_ignores_empty_env_value() {
    const VAR: &str = "SHIPIT_TEST_TOKEN_FALLBACK_BLANK";
    unsafe { std::env::set_var(VAR, "") };

    let (db, _dir) = temp_db();
    let storage = AuthStorage::open(&db).unwrap();
    assert!(storage.resolve(API, VAR).unwrap().is_none());
}

// ── Shared database ───────────────────────────────────────────────

#[test]
fn settings_and_tokens_share_a_database() {
    let (db, _dir) = temp_db();
    let settings = Settings::open(&db).unwrap();
    settings.set("api_url", API).unwrap();
    save_token(&db, API, "tok", None).unwrap();

    let resolved = Resolved::resolve(&Settings::open(&db).unwrap(), Overrides::default()).unwrap();
    assert_eq!(resolved.api_url, API);

    let token = AuthStorage::open(&db)
        .unwrap()
        .resolve(&resolved.api_url, "SHIPIT_TEST_TOKEN_UNSET_C")
        .unwrap();
    assert!(resolved.client_config(token).token.is_some());
}
