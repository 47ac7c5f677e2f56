/// Authentication module
///
/// Password hashing, credential verification, JWT encoding/validation,
/// token pair issuance and bearer-header authentication.

mod authenticator;
mod claims;
mod credentials;
mod issuer;
mod jwt;
mod password;
mod registration;

pub use authenticator::{authenticate, extract_token};
pub use claims::{Claims, Identity, TokenKind};
pub use credentials::CredentialVerifier;
pub use issuer::{TokenIssuer, TokenPair, TOKEN_TYPE};
pub use jwt::{TokenCodec, TokenError};
pub use password::PasswordHasher;
pub use registration::Registrar;
