// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle tests: restore, login, signup, logout.

use hercules_client::models::{BillingSelection, PaymentMethod, Role, User};
use hercules_client::services::session::{PersistedSession, SessionStore};
use hercules_client::services::{
    FileSessionStore, HerculesClient, LoginForm, MemorySessionStore, Session, SessionContext,
    SessionState, SignupForm,
};
use std::time::Duration;

mod common;

use common::{spawn_mock_api, unreachable_url, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, CUSTOMER_TOKEN};

fn stored_user() -> User {
    User {
        id: "u1".to_string(),
        email: CUSTOMER_EMAIL.to_string(),
        display_name: "Ola (cached)".to_string(),
        role: Role::Customer,
    }
}

fn file_store_with(dir: &tempfile::TempDir, token: &str) -> FileSessionStore {
    let store = FileSessionStore::new(dir.path().join("session.json"));
    store
        .save(&Session {
            access_token: token.to_string(),
            user: stored_user(),
        })
        .unwrap();
    store
}

#[tokio::test]
async fn test_restore_without_stored_session() {
    let api = spawn_mock_api().await;
    let mut session = SessionContext::new(Box::new(MemorySessionStore::new()));
    assert_eq!(session.state(), &SessionState::Loading);

    session.restore(&api.client()).await.unwrap();
    assert_eq!(session.state(), &SessionState::Anonymous);
    assert_eq!(session.role(), None);
}

#[tokio::test]
async fn test_restore_refreshes_user_from_api() {
    let api = spawn_mock_api().await;
    let dir = tempfile::tempdir().unwrap();
    let store = file_store_with(&dir, CUSTOMER_TOKEN);

    let mut session = SessionContext::new(Box::new(store.clone()));
    session.restore(&api.client()).await.unwrap();

    assert_eq!(session.user().unwrap().display_name, "Ola");
    assert_eq!(session.role(), Some(Role::Customer));
    assert!(session.profile().is_some());
    assert_eq!(store.load().unwrap().user.unwrap().display_name, "Ola");
}

#[tokio::test]
async fn test_restore_with_rejected_token_clears_storage() {
    let api = spawn_mock_api().await;
    let dir = tempfile::tempdir().unwrap();
    let store = file_store_with(&dir, "expired-token");

    let mut session = SessionContext::new(Box::new(store.clone()));
    session.restore(&api.client()).await.unwrap();

    assert_eq!(session.state(), &SessionState::Anonymous);
    assert_eq!(store.load().unwrap(), PersistedSession::default());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_restore_offline_keeps_stored_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store_with(&dir, CUSTOMER_TOKEN);
    let client = HerculesClient::new(unreachable_url().await, Duration::from_secs(2)).unwrap();

    let mut session = SessionContext::new(Box::new(store.clone()));
    session.restore(&client).await.unwrap();

    assert_eq!(session.user(), Some(&stored_user()));
    assert_eq!(store.load().unwrap().access_token.as_deref(), Some(CUSTOMER_TOKEN));
}

#[tokio::test]
async fn test_login_persists_and_logout_clears() {
    let api = spawn_mock_api().await;
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

    let mut session = SessionContext::new(Box::new(store.clone()));
    let user = session
        .login(
            &api.client(),
            &LoginForm::new(" OLA@example.no ", CUSTOMER_PASSWORD),
        )
        .await
        .unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(store.load().unwrap().access_token.as_deref(), Some(CUSTOMER_TOKEN));

    // A new context picks the session up from disk
    let mut restored = SessionContext::new(Box::new(store.clone()));
    restored.restore(&api.client()).await.unwrap();
    assert!(restored.is_authenticated());

    session.logout().unwrap();
    assert_eq!(session.state(), &SessionState::Anonymous);
    assert_eq!(store.load().unwrap(), PersistedSession::default());
}

#[tokio::test]
async fn test_failed_login_keeps_previous_state() {
    let api = spawn_mock_api().await;
    let mut session = SessionContext::new(Box::new(MemorySessionStore::new()));
    session.restore(&api.client()).await.unwrap();

    let err = session
        .login(&api.client(), &LoginForm::new(CUSTOMER_EMAIL, "feil"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Feil e-post eller passord");
    assert_eq!(session.state(), &SessionState::Anonymous);
}

#[tokio::test]
async fn test_signup_sends_billing_and_signs_in() {
    let api = spawn_mock_api().await;
    let mut session = SessionContext::new(Box::new(MemorySessionStore::new()));
    session.restore(&api.client()).await.unwrap();

    let form = SignupForm::new("Ny@Example.no", "passord1")
        .with_confirmation("passord1")
        .with_display_name("Nora")
        .with_billing(BillingSelection {
            payment_method: PaymentMethod::Vipps,
            payment_method_token: None,
        });
    let user = session.signup(&api.client(), &form).await.unwrap();
    assert_eq!(user.email, "ny@example.no");
    assert_eq!(user.role, Role::Customer);

    let body = api.with_state(|s| s.last_signup.clone()).unwrap();
    assert_eq!(body["navn"], "Nora");
    assert_eq!(body["payment_method"], "vipps");
    assert!(body.get("payment_method_token").is_none());
}

#[tokio::test]
async fn test_signup_rejected_while_logged_in() {
    let api = spawn_mock_api().await;
    let mut session = SessionContext::new(Box::new(MemorySessionStore::new()));
    session
        .login(&api.client(), &LoginForm::new(CUSTOMER_EMAIL, CUSTOMER_PASSWORD))
        .await
        .unwrap();

    let err = session
        .signup(&api.client(), &SignupForm::new("ny@example.no", "passord1"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(api.with_state(|s| s.last_signup.is_none()));
}

#[tokio::test]
async fn test_signup_validation_happens_before_request() {
    let api = spawn_mock_api().await;
    let mut session = SessionContext::new(Box::new(MemorySessionStore::new()));

    let form = SignupForm::new("ny@example.no", "passord1").with_confirmation("passord2");
    let err = session.signup(&api.client(), &form).await.unwrap_err();
    assert_eq!(err.user_message(), "Passwords do not match");
    assert!(api.with_state(|s| s.last_signup.is_none()));
}

#[tokio::test]
async fn test_duplicate_signup_surfaces_server_detail() {
    let api = spawn_mock_api().await;
    let mut session = SessionContext::new(Box::new(MemorySessionStore::new()));

    let err = session
        .signup(&api.client(), &SignupForm::new(CUSTOMER_EMAIL, "passord1"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "E-post er allerede registrert");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_refresh_profile_updates_cached_user() {
    let api = spawn_mock_api().await;
    let store = MemorySessionStore::with(PersistedSession {
        access_token: Some(CUSTOMER_TOKEN.to_string()),
        user: Some(stored_user()),
    });
    let client = HerculesClient::new(unreachable_url().await, Duration::from_secs(2)).unwrap();

    let mut session = SessionContext::new(Box::new(store));
    session.restore(&client).await.unwrap();
    assert_eq!(session.user().unwrap().display_name, "Ola (cached)");

    session.refresh_profile(&api.client()).await.unwrap();
    assert_eq!(session.user().unwrap().display_name, "Ola");

    let authorized = session.authorized(&api.client()).unwrap();
    assert_eq!(authorized.access_token(), CUSTOMER_TOKEN);
}
