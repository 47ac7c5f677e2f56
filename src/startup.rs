use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{CredentialVerifier, PasswordHasher, Registrar, TokenIssuer};
use crate::configuration::{JwtSettings, PasswordSettings};
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::middleware::JwtMiddleware;
use crate::routes::{get_current_user, health_check, login, readiness_check, refresh, register};
use crate::store::UserStore;

const MAX_JSON_BODY_BYTES: usize = 4 * 1024;

/// Services shared by every worker
///
/// Built once at startup; all of them are read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn UserStore>,
    registrar: Arc<Registrar>,
    verifier: Arc<CredentialVerifier>,
    issuer: Arc<TokenIssuer>,
}

impl AppState {
    /// # Errors
    /// Fails on invalid JWT or password settings, including a missing secret
    pub fn build(
        store: Arc<dyn UserStore>,
        jwt_config: &JwtSettings,
        password_config: &PasswordSettings,
    ) -> Result<Self, AppError> {
        let hasher = PasswordHasher::new(password_config.bcrypt_cost)?;
        let issuer = TokenIssuer::new(jwt_config)?;

        Ok(Self {
            registrar: Arc::new(Registrar::new(store.clone(), hasher)),
            verifier: Arc::new(CredentialVerifier::new(store.clone(), hasher)?),
            store,
            issuer: Arc::new(issuer),
        })
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Register shared state and routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(json_config())
            .app_data(web::Data::from(self.store.clone()))
            .app_data(web::Data::from(self.registrar.clone()))
            .app_data(web::Data::from(self.verifier.clone()))
            .app_data(web::Data::from(self.issuer.clone()))
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/health_check/ready", web::get().to(readiness_check))
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            // Protected routes
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(self.issuer.clone()))
                    .route("/me", web::get().to(get_current_user)),
            );
    }
}

/// Body extraction failures use the standard 400 error shape
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY_BYTES)
        .error_handler(|err, _req| {
            AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
        })
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .configure(|cfg| state.configure(cfg))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
