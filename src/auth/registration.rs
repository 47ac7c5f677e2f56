/// User Registration
///
/// Hashes the password and creates the credential record.

use chrono::Utc;
use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::error::{AppError, DatabaseError};
use crate::store::UserStore;

pub struct Registrar {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl Registrar {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Create a user and return the new id
    ///
    /// The email is checked up front so a duplicate does not pay for a hash;
    /// a concurrent insert that wins the race still surfaces as a unique
    /// violation from the store.
    ///
    /// # Errors
    /// - `DatabaseError::UniqueConstraintViolation` if the email is taken
    /// - `AppError::Internal` if hashing fails
    pub async fn register(&self, email: &str, password: &str) -> Result<i64, AppError> {
        if self.store.find_by_email(email).await?.is_some() {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            )
            .into());
        }

        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

        let user_id = self.store.insert(email, &password_hash, Utc::now()).await?;
        Ok(user_id)
    }
}
