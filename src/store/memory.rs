use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{CredentialRecord, UserStore};
use crate::error::DatabaseError;

/// Process-local user store
///
/// Same contract as the Postgres backend: unique emails, sequential ids
/// starting at 1.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, CredentialRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, CredentialRecord>>, DatabaseError> {
        self.users
            .lock()
            .map_err(|_| DatabaseError::ConnectionPool("in-memory store poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DatabaseError> {
        Ok(self.lock()?.get(email).cloned())
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        let mut users = self.lock()?;
        if users.contains_key(email) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            ));
        }

        let user_id = users.len() as i64 + 1;
        users.insert(
            email.to_string(),
            CredentialRecord {
                user_id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at,
            },
        );

        Ok(user_id)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.lock().map(|_| ())
    }
}
