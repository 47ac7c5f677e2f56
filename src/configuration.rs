use config::ConfigError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub password: PasswordSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Full connection URL; takes precedence over the individual fields
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Connections are recycled after this long
    pub max_lifetime_seconds: u64,
    /// Idle connections are closed after this long
    pub idle_timeout_seconds: u64,
    /// `sslmode=require` when set, `prefer` otherwise
    pub require_ssl: bool,
    /// Upper bound for every datastore call
    pub timeout_seconds: u64,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                self.username,
                self.password,
                self.host,
                self.port,
                self.database_name,
                self.ssl_mode()
            ),
        }
    }

    fn ssl_mode(&self) -> &'static str {
        if self.require_ssl {
            "require"
        } else {
            "prefer"
        }
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        PgConnectOptions::from_str(&self.connection_string())
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .max_lifetime(self.max_lifetime())
            .idle_timeout(self.idle_timeout())
            .acquire_timeout(self.timeout())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_seconds)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

/// JWT authentication settings
///
/// `secret` has no default. An empty value is rejected when the token codec
/// is built.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret: String,
    pub access_token_expiry: i64,  // seconds (900 = 15 minutes)
    pub refresh_token_expiry: i64, // seconds (604800 = 7 days)
}

#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    pub bcrypt_cost: u32,
}

/// Load settings
///
/// Precedence, lowest first: built-in defaults, `configuration.*` file,
/// `APP_SECTION__KEY` environment variables, then `JWT_SECRET` and
/// `DATABASE_URL`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "password")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.database_name", "auth")?
        .set_default("database.max_connections", 30)?
        .set_default("database.min_connections", 5)?
        .set_default("database.max_lifetime_seconds", 3600)?
        .set_default("database.idle_timeout_seconds", 1800)?
        .set_default("database.require_ssl", false)?
        .set_default("database.timeout_seconds", 5)?
        .set_default("jwt.access_token_expiry", 900)?
        .set_default("jwt.refresh_token_expiry", 604_800)?
        .set_default("password.bcrypt_cost", 12)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        );

    if let Ok(secret) = std::env::var("JWT_SECRET") {
        builder = builder.set_override("jwt.secret", secret)?;
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    builder.build()?.try_deserialize::<Settings>()
}
