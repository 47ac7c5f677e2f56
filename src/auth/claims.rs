/// JWT Claims structure
///
/// The payload carried by both access and refresh tokens, plus the
/// `Identity` that is derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated user. Immutable once embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
}

/// Which flow a token was minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT Claims
///
/// Every field is required; a token missing any of them fails to decode.
/// Timestamps are Unix seconds and use the registered claim names on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "nbf")]
    pub not_before: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
    pub token_kind: TokenKind,
}

impl Claims {
    /// Create claims valid from `now` for `lifetime_seconds`
    ///
    /// Returns `None` unless `expires_at > issued_at` can be represented,
    /// i.e. for a non-positive lifetime or an overflowing expiry.
    pub fn new(
        identity: &Identity,
        kind: TokenKind,
        now: i64,
        lifetime_seconds: i64,
    ) -> Option<Self> {
        if lifetime_seconds <= 0 {
            return None;
        }
        let expires_at = now.checked_add(lifetime_seconds)?;

        Some(Self {
            user_id: identity.user_id,
            email: identity.email.clone(),
            issued_at: now,
            not_before: now,
            expires_at,
            token_kind: kind,
        })
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            email: self.email.clone(),
        }
    }

    /// Whether `now` falls inside `[not_before, expires_at)`
    pub fn is_active_at(&self, now: i64) -> bool {
        self.not_before <= now && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: 42,
            email: "test@example.com".to_string(),
        }
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(&identity(), TokenKind::Access, 1_000, 900).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.issued_at, 1_000);
        assert_eq!(claims.not_before, 1_000);
        assert_eq!(claims.expires_at, 1_900);
        assert!(claims.expires_at > claims.issued_at);
    }

    #[test]
    fn test_identity_roundtrip() {
        let claims = Claims::new(&identity(), TokenKind::Refresh, 0, 60).unwrap();
        assert_eq!(claims.identity(), identity());
    }

    #[test]
    fn test_validity_window_is_half_open() {
        let claims = Claims::new(&identity(), TokenKind::Access, 100, 10).unwrap();

        assert!(!claims.is_active_at(99));
        assert!(claims.is_active_at(100));
        assert!(claims.is_active_at(109));
        assert!(!claims.is_active_at(110));
    }

    #[test]
    fn test_wire_field_names() {
        let claims = Claims::new(&identity(), TokenKind::Refresh, 5, 10).unwrap();
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["iat"], 5);
        assert_eq!(json["nbf"], 5);
        assert_eq!(json["exp"], 15);
        assert_eq!(json["token_kind"], "refresh");
    }

    #[test]
    fn test_unrepresentable_expiry_is_refused() {
        assert!(Claims::new(&identity(), TokenKind::Access, 1_000, 0).is_none());
        assert!(Claims::new(&identity(), TokenKind::Access, 1_000, -5).is_none());
        assert!(Claims::new(&identity(), TokenKind::Refresh, 1_000, i64::MAX).is_none());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"user_id":1,"email":"a@b.com","iat":1,"nbf":1,"exp":2}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }
}
