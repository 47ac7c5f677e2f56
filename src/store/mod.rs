/// User store
///
/// The datastore is an external collaborator with two operations. Backends
/// implement `UserStore`; `TimeoutUserStore` bounds every call.

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

use crate::auth::Identity;
use crate::error::DatabaseError;

/// A persisted user row
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub user_id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            email: self.email.clone(),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup by email
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DatabaseError>;

    /// Create a user and return its id
    ///
    /// Fails with `UniqueConstraintViolation` if the email is taken.
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError>;

    /// Round-trip to the backend; used by the readiness check
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Wraps a store so no call can outlive `timeout`
pub struct TimeoutUserStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: UserStore> TimeoutUserStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Configured bound in milliseconds, saturating at `u64::MAX`
    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, DatabaseError>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.timeout_ms();
                tracing::error!(operation, timeout_ms, "Datastore call timed out");
                Err(DatabaseError::Timeout(timeout_ms))
            }
        }
    }
}

#[async_trait]
impl<S: UserStore> UserStore for TimeoutUserStore<S> {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DatabaseError> {
        self.bounded("find_by_email", self.inner.find_by_email(email))
            .await
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.bounded("insert", self.inner.insert(email, password_hash, created_at))
            .await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.bounded("ping", self.inner.ping()).await
    }
}
