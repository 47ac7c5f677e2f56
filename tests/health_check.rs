//! Integration tests for server plumbing

use async_trait::async_trait;
use bearer_auth::configuration::{JwtSettings, PasswordSettings};
use bearer_auth::error::DatabaseError;
use bearer_auth::startup::{run, AppState};
use bearer_auth::store::{CredentialRecord, InMemoryUserStore, TimeoutUserStore, UserStore};
use chrono::{DateTime, Utc};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

fn jwt_settings(secret: &str) -> JwtSettings {
    JwtSettings {
        secret: secret.to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604_800,
    }
}

/// A datastore that never answers
struct UnreachableStore;

#[async_trait]
impl UserStore for UnreachableStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<CredentialRecord>, DatabaseError> {
        std::future::pending().await
    }

    async fn insert(
        &self,
        _email: &str,
        _password_hash: &str,
        _created_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        std::future::pending().await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        std::future::pending().await
    }
}

fn spawn_app() -> String {
    spawn_app_with(Arc::new(InMemoryUserStore::new()))
}

fn spawn_app_with(store: Arc<dyn UserStore>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let state = AppState::build(
        store,
        &jwt_settings("health-check-secret-of-sufficient-length"),
        &PasswordSettings { bcrypt_cost: 4 },
    )
    .expect("Failed to build application state");
    let server = run(listener, state).expect("Failed to create server");

    let _ = tokio::spawn(async move {
        let _ = server.await;
    });

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn readiness_check_pings_the_datastore() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check/ready", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "READY");
}

#[tokio::test]
async fn readiness_check_reports_unreachable_datastore() {
    let store = TimeoutUserStore::new(UnreachableStore, Duration::from_millis(50));
    let addr = spawn_app_with(Arc::new(store));

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check/ready", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "DATASTORE_UNAVAILABLE");

    // Liveness does not depend on the datastore
    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/does-not-exist", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
}

#[test]
fn startup_fails_without_secret() {
    let result = AppState::build(
        Arc::new(InMemoryUserStore::new()),
        &jwt_settings(""),
        &PasswordSettings { bcrypt_cost: 4 },
    );
    assert!(result.is_err());
}

#[test]
fn startup_fails_with_development_fallback_secret() {
    let result = AppState::build(
        Arc::new(InMemoryUserStore::new()),
        &jwt_settings("your-secret-key"),
        &PasswordSettings { bcrypt_cost: 4 },
    );
    assert!(result.is_err());
}
