/// Credential Verification
///
/// Looks a user up by email and checks the password. Unknown email and wrong
/// password are indistinguishable to the caller, in result and in timing.

use std::sync::Arc;

use crate::auth::claims::Identity;
use crate::auth::password::PasswordHasher;
use crate::error::{AppError, AuthError};
use crate::store::UserStore;

const TIMING_DECOY_PASSWORD: &str = "timing-decoy-password";

pub struct CredentialVerifier {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    /// Hashed at the configured cost and verified against when the email is unknown.
    decoy_hash: String,
}

impl CredentialVerifier {
    /// # Errors
    /// Returns error if the decoy hash cannot be computed
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Result<Self, AppError> {
        let decoy_hash = hasher.hash(TIMING_DECOY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            decoy_hash,
        })
    }

    /// Authenticate an email/password pair
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials` for an unknown email or a wrong password
    /// - `DatabaseError` if the lookup fails or times out
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AppError> {
        let record = self.store.find_by_email(email).await?;

        let (identity, password_hash) = match record {
            Some(record) => (Some(record.identity()), record.password_hash),
            None => (None, self.decoy_hash.clone()),
        };

        let hasher = self.hasher;
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

        match identity {
            Some(identity) if matches => Ok(identity),
            Some(identity) => {
                tracing::debug!(user_id = identity.user_id, "Password mismatch");
                Err(AuthError::InvalidCredentials.into())
            }
            None => {
                tracing::debug!("Login attempt for unknown email");
                Err(AuthError::InvalidCredentials.into())
            }
        }
    }
}
