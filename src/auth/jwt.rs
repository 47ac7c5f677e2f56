/// JWT Token Encoding and Decoding
///
/// HS256 compact serialization over the full claim set. The codec owns the
/// signing secret; it is handed in once at construction and never read from
/// the environment here.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use crate::auth::claims::{Claims, TokenKind};
use crate::error::{AppError, ConfigError};

const MIN_SECRET_LENGTH: usize = 32;

/// Why a token was rejected
///
/// Only ever logged; callers map every variant to the same 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Malformed(String),
    BadSignature,
    Expired,
    NotYetValid,
    WrongKind { expected: TokenKind, found: TokenKind },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed(msg) => write!(f, "malformed token: {}", msg),
            TokenError::BadSignature => write!(f, "bad signature"),
            TokenError::Expired => write!(f, "token expired"),
            TokenError::NotYetValid => write!(f, "token not yet valid"),
            TokenError::WrongKind { expected, found } => {
                write!(f, "expected {} token, got {}", expected, found)
            }
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Signs and verifies tokens with a single symmetric secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the configured secret
    ///
    /// # Errors
    /// Fails when the secret is empty or shorter than 32 bytes.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingRequired(
                "jwt.secret (set JWT_SECRET)".to_string(),
            ));
        }
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        // The validity window is checked in `decode_at` against a caller-supplied clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Serialize and sign claims
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify a token against the current clock
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify signature and structure, then require `not_before <= now < expires_at`
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if now >= claims.expires_at {
            return Err(TokenError::Expired);
        }
        if now < claims.not_before {
            return Err(TokenError::NotYetValid);
        }

        Ok(claims)
    }

    /// Decode and additionally require a specific token kind
    pub fn decode_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.token_kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.token_kind,
            });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Identity;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET).expect("Failed to build codec")
    }

    fn claims_at(now: i64, lifetime: i64) -> Claims {
        let identity = Identity {
            user_id: 7,
            email: "test@example.com".to_string(),
        };
        Claims::new(&identity, TokenKind::Access, now, lifetime).expect("Invalid test claims")
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Replace the character at `idx` of `part` (0 = header, 1 = payload, 2 = signature)
    fn tamper(token: &str, part: usize, idx: usize) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let target = &mut parts[part];
        let original = target.as_bytes()[idx];
        let replacement = if original == b'A' { 'B' } else { 'A' };
        target.replace_range(idx..idx + 1, &replacement.to_string());
        parts.join(".")
    }

    /// Spread of positions inside a segment; the final character is skipped
    /// since its low bits may be padding.
    fn positions(token: &str, part: usize) -> Vec<usize> {
        let len = token.split('.').nth(part).map_or(0, str::len);
        let mut idxs = vec![0, 1, len / 4, len / 2, (3 * len) / 4, len - 2];
        idxs.sort_unstable();
        idxs.dedup();
        idxs
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let codec = codec();
        let claims = claims_at(now(), 900);

        let token = codec.encode(&claims).expect("Failed to encode");
        let decoded = codec.decode(&token).expect("Failed to decode");

        assert_eq!(decoded, claims);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec();
        let now = now();

        let expired = codec.encode(&claims_at(now - 61, 60)).unwrap();
        assert_eq!(codec.decode_at(&expired, now), Err(TokenError::Expired));

        let live = codec.encode(&claims_at(now - 59, 60)).unwrap();
        assert!(codec.decode_at(&live, now).is_ok());
    }

    #[test]
    fn test_expires_at_equal_to_now_is_expired() {
        let codec = codec();
        let token = codec.encode(&claims_at(1_000, 10)).unwrap();

        assert!(codec.decode_at(&token, 1_009).is_ok());
        assert_eq!(codec.decode_at(&token, 1_010), Err(TokenError::Expired));
    }

    #[test]
    fn test_not_yet_valid() {
        let codec = codec();
        let token = codec.encode(&claims_at(2_000, 60)).unwrap();

        assert_eq!(codec.decode_at(&token, 1_999), Err(TokenError::NotYetValid));
    }

    #[test]
    fn test_tampered_header_is_rejected() {
        let codec = codec();
        let token = codec.encode(&claims_at(now(), 900)).unwrap();

        for idx in positions(&token, 0) {
            assert!(
                codec.decode(&tamper(&token, 0, idx)).is_err(),
                "header change at {} accepted",
                idx
            );
        }
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec.encode(&claims_at(now(), 900)).unwrap();

        for idx in positions(&token, 1) {
            assert!(
                codec.decode(&tamper(&token, 1, idx)).is_err(),
                "payload change at {} accepted",
                idx
            );
        }
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let codec = codec();
        let token = codec.encode(&claims_at(now(), 900)).unwrap();

        for idx in positions(&token, 2) {
            assert_eq!(
                codec.decode(&tamper(&token, 2, idx)),
                Err(TokenError::BadSignature),
                "signature change at {}",
                idx
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let token = codec().encode(&claims_at(now(), 900)).unwrap();
        let other = TokenCodec::new("another-secret-key-of-sufficient-length!").unwrap();

        assert_eq!(other.decode(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = codec().decode("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Malformed(_))));

        let result = codec().decode("");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let codec = codec();
        let token = codec.encode(&claims_at(now(), 900)).unwrap();

        assert_eq!(
            codec.decode_kind(&token, TokenKind::Refresh),
            Err(TokenError::WrongKind {
                expected: TokenKind::Refresh,
                found: TokenKind::Access,
            })
        );
        assert!(codec.decode_kind(&token, TokenKind::Access).is_ok());
    }

    #[test]
    fn test_secret_is_required() {
        assert!(matches!(
            TokenCodec::new(""),
            Err(ConfigError::MissingRequired(_))
        ));
        assert!(matches!(
            TokenCodec::new("your-secret-key"),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
