use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install structured JSON logging on stdout
///
/// `RUST_LOG` controls the filter, `info` when unset. Records emitted through
/// the `log` facade are forwarded as well.
pub fn init_telemetry() {
    init_telemetry_with("info");
}

pub fn init_telemetry_with(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    // A second initialisation (e.g. several test binaries sharing a process) is a no-op.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init();
}
