/// Password Hashing and Verification
///
/// bcrypt with a configurable work factor.

use bcrypt::{hash, verify};

use crate::error::{AppError, ConfigError};

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// # Errors
    /// Returns error if `cost` is outside bcrypt's supported range
    pub fn new(cost: u32) -> Result<Self, ConfigError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(ConfigError::InvalidValue(format!(
                "password.bcrypt_cost must be between {} and {}",
                MIN_COST, MAX_COST
            )));
        }
        Ok(Self { cost })
    }

    /// Hash a password with a fresh salt
    ///
    /// # Errors
    /// Returns error if bcrypt fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored hash
    ///
    /// An unparseable hash counts as a mismatch.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        match verify(password, password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be verified");
                false
            }
        }
    }
}
