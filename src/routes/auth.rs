/// Authentication Routes
///
/// Registration, login, token refresh and the current identity.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialVerifier, Identity, Registrar, TokenIssuer, TokenPair};
use crate::error::AppError;
use crate::validators::{is_valid_email, is_valid_password, require_non_empty};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
    pub tokens: TokenPair,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub tokens: TokenPair,
}

/// POST /register
///
/// # Errors
/// - 400: Malformed body, invalid email, empty or over-long password
/// - 409: Email already registered
/// - 500: Hashing or datastore failure
pub async fn register(
    form: web::Json<RegisterRequest>,
    registrar: web::Data<Registrar>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let user_id = registrar.register(&email, &form.password).await?;

    tracing::info!(user_id = user_id, "User registered successfully");

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user_id,
    }))
}

/// POST /login
///
/// # Errors
/// - 400: Malformed body or empty fields
/// - 401: Invalid credentials (unknown email and wrong password look the same)
/// - 500: Datastore or token issuance failure
pub async fn login(
    form: web::Json<LoginRequest>,
    verifier: web::Data<CredentialVerifier>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, AppError> {
    require_non_empty("email", &form.email)?;
    require_non_empty("password", &form.password)?;

    let identity = verifier
        .verify_credentials(form.email.trim(), &form.password)
        .await?;
    let tokens = issuer.issue_pair(&identity)?;

    tracing::info!(user_id = identity.user_id, "User logged in successfully");

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        user: UserResponse {
            id: identity.user_id,
            email: identity.email,
        },
        tokens,
    }))
}

/// POST /refresh
///
/// Stateless: the presented refresh token stays valid until it expires.
///
/// # Errors
/// - 400: Malformed body
/// - 401: Invalid, expired, or non-refresh token
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, AppError> {
    let tokens = issuer.refresh(&form.refresh_token)?;

    tracing::info!("Token refreshed successfully");

    Ok(HttpResponse::Ok().json(RefreshResponse {
        message: "Token refreshed successfully".to_string(),
        tokens,
    }))
}

/// GET /api/me
///
/// **Requires a valid access token**; the identity is injected by `JwtMiddleware`.
pub async fn get_current_user(identity: web::ReqData<Identity>) -> HttpResponse {
    HttpResponse::Ok().json(identity.into_inner())
}
