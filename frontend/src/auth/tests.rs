use super::*;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::web::{MemoryStorage, MockHttpClient};
use serde_json::json;

const LOGIN_URL: &str = "http://test/api/auth/login";
const REGISTER_URL: &str = "http://test/api/auth/register";

fn setup() -> (Authenticator<MockHttpClient, MemoryStorage>, Arc<MockHttpClient>, MemoryStorage) {
    let config = AppConfig {
        api_base: "http://test".to_string(),
        lookup_token: None,
        log_level: log::LevelFilter::Off,
    };
    let client = Arc::new(MockHttpClient::new());
    let storage = MemoryStorage::new();
    let api = MaishaApi::new(&config, Arc::clone(&client), storage.clone());
    (Authenticator::new(api), client, storage)
}

fn seeded_user() -> AuthUser {
    AuthUser {
        id: 9,
        name: "Clarisse".to_string(),
        email: "clarisse@maisha.rw".to_string(),
        role: Some(Role::GroupAdmin),
        group_id: Some(2),
        group: None,
    }
}

#[tokio::test]
async fn login_persists_user_and_token() {
    let (auth, client, storage) = setup();
    client.mock_response(
        LOGIN_URL,
        200,
        json!({
            "user": {
                "id": 3, "name": "Eric", "email": "eric@maisha.rw",
                "role": "group_user", "group_id": 2, "group": { "id": 2, "name": "Twiyubake" },
                "password_hash": "ignored"
            },
            "token": "tok-1"
        }),
    );

    let user = auth.login("eric@maisha.rw", "pw").await.unwrap();
    assert_eq!(user.role, Some(Role::GroupUser));
    assert_eq!(user.group.as_ref().map(|g| g.name.as_str()), Some("Twiyubake"));
    assert_eq!(storage.get(STORAGE_TOKEN_KEY).as_deref(), Some("tok-1"));
    assert_eq!(auth.restore(), Some(user));
}

#[tokio::test]
async fn failed_login_leaves_session_untouched() {
    let (auth, client, storage) = setup();
    auth.store().save(&seeded_user(), Some("old-token"));
    let before = storage.snapshot();

    client.mock_raw(LOGIN_URL, 401, "Invalid credentials");
    assert_eq!(auth.login("x@y.z", "bad").await, None);
    assert_eq!(storage.snapshot(), before);

    client.mock_response(LOGIN_URL, 200, json!({ "token": "no-user" }));
    assert_eq!(auth.login("x@y.z", "bad").await, None);
    assert_eq!(storage.snapshot(), before);

    client.mock_response(LOGIN_URL, 200, json!({ "user": "not an object" }));
    assert_eq!(auth.login("x@y.z", "bad").await, None);

    client.mock_network_failure(LOGIN_URL);
    assert_eq!(auth.login("x@y.z", "bad").await, None);
    assert_eq!(storage.snapshot(), before);
}

#[tokio::test]
async fn login_without_token_keeps_previous_token() {
    let (auth, client, storage) = setup();
    storage.set(STORAGE_TOKEN_KEY, "old-token");
    client.mock_response(LOGIN_URL, 200, json!({ "user": { "id": 1, "role": "member" } }));

    assert!(auth.login("m@maisha.rw", "pw").await.is_some());
    assert_eq!(storage.get(STORAGE_TOKEN_KEY).as_deref(), Some("old-token"));
}

#[tokio::test]
async fn register_drops_group_summary() {
    let (auth, client, _) = setup();
    client.mock_response(
        REGISTER_URL,
        201,
        json!({ "user": { "id": 4, "name": "New", "email": "n@maisha.rw", "group_id": 5, "group": { "id": 5, "name": "G" } }, "token": "t" }),
    );

    let user = auth.register("New", "n@maisha.rw", "pw").await.unwrap();
    assert_eq!(user.group_id, Some(5));
    assert_eq!(user.group, None);
    assert_eq!(user.role, None);
}

#[test]
fn logout_is_idempotent() {
    let (auth, _, storage) = setup();
    auth.store().save(&seeded_user(), Some("t"));

    auth.logout();
    assert!(storage.snapshot().is_empty());
    auth.logout();
    assert!(storage.snapshot().is_empty());
    assert_eq!(auth.restore(), None);
}

#[test]
fn restore_reads_persisted_user() {
    let (auth, _, storage) = setup();
    storage.set(
        STORAGE_USER_KEY,
        r#"{"id":9,"name":"Clarisse","email":"clarisse@maisha.rw","role":"group_admin","group_id":2}"#,
    );

    assert_eq!(auth.restore(), Some(seeded_user()));
}

#[test]
fn corrupt_persisted_user_is_removed() {
    let (auth, _, storage) = setup();
    storage.set(STORAGE_USER_KEY, "{not json");
    storage.set(STORAGE_TOKEN_KEY, "t");

    assert_eq!(auth.restore(), None);
    assert_eq!(storage.get(STORAGE_USER_KEY), None);
    assert_eq!(auth.store().token().as_deref(), Some("t"));
}

#[test]
fn unknown_role_restores_as_roleless() {
    let (auth, _, storage) = setup();
    storage.set(STORAGE_USER_KEY, r#"{"id":1,"role":"auditor"}"#);

    let user = auth.restore().unwrap();
    assert_eq!(user.role, None);
    assert!(!user.has_role(&Role::ALL));
}
