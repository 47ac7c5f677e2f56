/// Token Issuance
///
/// Mints access/refresh pairs and exchanges a refresh token for a new pair.
/// Nothing is persisted: a token stays valid until it expires, even after a
/// newer pair has been issued.

use serde::{Deserialize, Serialize};

use crate::auth::claims::{Claims, Identity, TokenKind};
use crate::auth::jwt::{TokenCodec, TokenError};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};

pub const TOKEN_TYPE: &str = "Bearer";

/// Upper bound for either token lifetime (10 years)
pub const MAX_TOKEN_LIFETIME_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Token pair returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl TokenIssuer {
    /// # Errors
    /// Fails on a missing/short secret or a lifetime outside
    /// `1..=MAX_TOKEN_LIFETIME_SECONDS`
    pub fn new(config: &JwtSettings) -> Result<Self, ConfigError> {
        check_lifetime("jwt.access_token_expiry", config.access_token_expiry)?;
        check_lifetime("jwt.refresh_token_expiry", config.refresh_token_expiry)?;

        Ok(Self {
            codec: TokenCodec::new(&config.secret)?,
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
        })
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, AppError> {
        self.issue_pair_at(identity, chrono::Utc::now().timestamp())
    }

    /// Mint both tokens as of `now`
    pub fn issue_pair_at(&self, identity: &Identity, now: i64) -> Result<TokenPair, AppError> {
        let access = claims_at(identity, TokenKind::Access, now, self.access_token_expiry)?;
        let refresh = claims_at(identity, TokenKind::Refresh, now, self.refresh_token_expiry)?;

        Ok(TokenPair {
            access_token: self.codec.encode(&access)?,
            refresh_token: self.codec.encode(&refresh)?,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The identity comes from the token alone; the user is not re-read from
    /// the store. Access tokens are refused here.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self
            .codec
            .decode_kind(refresh_token, TokenKind::Refresh)
            .map_err(AuthError::InvalidRefreshToken)?;

        self.issue_pair(&claims.identity())
    }

    /// Validate an access token presented on a protected route
    pub fn validate_access_token(&self, token: &str) -> Result<Identity, TokenError> {
        self.codec
            .decode_kind(token, TokenKind::Access)
            .map(|claims| claims.identity())
    }
}

fn check_lifetime(name: &str, seconds: i64) -> Result<(), ConfigError> {
    if seconds <= 0 || seconds > MAX_TOKEN_LIFETIME_SECONDS {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be between 1 and {} seconds",
            name, MAX_TOKEN_LIFETIME_SECONDS
        )));
    }
    Ok(())
}

fn claims_at(
    identity: &Identity,
    kind: TokenKind,
    now: i64,
    lifetime: i64,
) -> Result<Claims, AppError> {
    Claims::new(identity, kind, now, lifetime).ok_or_else(|| {
        AppError::Internal(format!("{} token expiry overflows at iat={}", kind, now))
    })
}
