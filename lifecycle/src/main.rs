// FocusFlow Plugin Lifecycle Manager
// Main entry point for the focusflow-lifecycle binary

use clap::Parser;
use focusflow_lifecycle::cli::{Cli, Command};
use focusflow_lifecycle::config::Config;
use focusflow_lifecycle::handlers::{
    handle_info, handle_install, handle_status, handle_uninstall, handle_validate, OutputFormat,
};
use focusflow_lifecycle::telemetry::{init_telemetry, init_telemetry_with_level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize basic telemetry first (before config is loaded)
    init_telemetry();

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!(
        "FocusFlow Lifecycle v{} ({} - {})",
        version,
        commit,
        timestamp
    );

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // Re-initialize telemetry: --log beats the config level
    // (only takes effect if RUST_LOG env var is not set)
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    // Handle commands
    match cli.command {
        Command::Install { user_id, base_dir } => {
            tracing::info!("Installing FocusFlow for {}", user_id);
            handle_install(user_id, base_dir, &config, format).await
        }

        Command::Uninstall { user_id, base_dir } => {
            tracing::info!("Uninstalling FocusFlow for {}", user_id);
            handle_uninstall(user_id, base_dir, &config, format).await
        }

        Command::Status { user_id, base_dir } => {
            tracing::info!("Checking FocusFlow status for {}", user_id);
            handle_status(user_id, base_dir, &config, format).await
        }

        Command::Validate { dir } => {
            tracing::info!("Validating bundle at {}", dir.display());
            handle_validate(&dir, format).await
        }

        Command::Info => handle_info(format),
    }
}
