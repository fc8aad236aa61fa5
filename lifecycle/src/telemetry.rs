//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for structured logging. Log output always
//! goes to stderr: stdout is reserved for operation reports, which hosts
//! pipe into other tools.
//!
//! Debug builds log pretty-printed for terminals; release builds log JSON
//! with span context for ingestion.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber with the given log level from config.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter > default "info"
pub fn init_telemetry_with_level(log_level: &str) {
    let default_filter = format!("{},focusflow_lifecycle={}", log_level, log_level);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}

/// Initialize the tracing subscriber before the config is loaded.
///
/// Falls back to "info" unless `RUST_LOG` overrides it; once the config is
/// available, call `init_telemetry_with_level` with its log level.
pub fn init_telemetry() {
    init_telemetry_with_level("info");
}
