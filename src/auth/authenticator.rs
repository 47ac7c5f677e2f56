/// Request Authentication
///
/// Turns a raw `Authorization` header value into an `Identity`.

use crate::auth::claims::Identity;
use crate::auth::issuer::TokenIssuer;
use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Strip the `Bearer ` scheme if present
///
/// The prefix is case-sensitive and only stripped when something follows it;
/// otherwise the whole value is treated as the token.
pub fn extract_token(header_value: &str) -> &str {
    if header_value.len() > BEARER_PREFIX.len() && header_value.starts_with(BEARER_PREFIX) {
        &header_value[BEARER_PREFIX.len()..]
    } else {
        header_value
    }
}

/// Validate the header and return the caller's identity
///
/// # Errors
/// - `AuthError::MissingToken` when no header was sent
/// - `AuthError::InvalidToken` for any decode failure; the cause is logged only
pub fn authenticate(raw_header: Option<&str>, issuer: &TokenIssuer) -> Result<Identity, AuthError> {
    let header_value = match raw_header {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::MissingToken),
    };

    issuer
        .validate_access_token(extract_token(header_value))
        .map_err(|cause| {
            tracing::warn!(error = %cause, "Bearer token rejected");
            AuthError::InvalidToken(cause)
        })
}
