use bearer_auth::configuration::get_configuration;
use bearer_auth::startup::{run, AppState};
use bearer_auth::store::{PgUserStore, TimeoutUserStore, UserStore};
use bearer_auth::telemetry::init_telemetry;
use std::net::TcpListener;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    tracing::info!("Attempting to connect to database");

    let connect_options = configuration.database.connect_options().map_err(|e| {
        tracing::error!("Invalid database connection settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    let pool = configuration
        .database
        .pool_options()
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
        })?;

    tracing::info!("Database ready");

    let store = Arc::new(TimeoutUserStore::new(
        PgUserStore::new(pool),
        configuration.database.timeout(),
    ));

    store.ping().await.map_err(|e| {
        tracing::error!("Database ping failed: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Database connection error",
        )
    })?;

    // Refuses to start without a usable JWT secret.
    let state = AppState::build(store, &configuration.jwt, &configuration.password).map_err(|e| {
        tracing::error!("Failed to initialise authentication services: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, state)?;
    tracing::info!("Server started successfully");

    server.await
}
