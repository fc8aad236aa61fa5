//! CLI interface for the FocusFlow lifecycle manager
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines the lifecycle commands and the global flags shared by all of
//! them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FocusFlow Plugin Lifecycle Manager
///
/// Installs, uninstalls, and inspects the FocusFlow plugin for users of a
/// dashboard host: stages the bundle into shared storage, registers plugin
/// and module records, and generates the plugin's page.
#[derive(Parser, Debug)]
#[command(name = "focusflow-lifecycle")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output reports in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install the plugin for a user
    Install {
        /// User to install for
        user_id: String,

        /// Override the shared plugins base directory
        #[arg(long, value_name = "DIR")]
        base_dir: Option<PathBuf>,
    },

    /// Uninstall the plugin for a user
    Uninstall {
        /// User to uninstall for
        user_id: String,

        /// Override the shared plugins base directory
        #[arg(long, value_name = "DIR")]
        base_dir: Option<PathBuf>,
    },

    /// Show installation state and bundle health for a user
    Status {
        /// User to check
        user_id: String,

        /// Override the shared plugins base directory
        #[arg(long, value_name = "DIR")]
        base_dir: Option<PathBuf>,
    },

    /// Validate a bundle directory without installing it
    Validate {
        /// Bundle directory to check
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Show plugin metadata and build information
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["focusflow-lifecycle", "info"]);
        assert!(matches!(cli.command, Command::Info));
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["focusflow-lifecycle", "--json", "--log", "debug", "info"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
    }

    #[test]
    fn test_install_command() {
        let cli = Cli::parse_from(["focusflow-lifecycle", "install", "user-1"]);
        if let Command::Install { user_id, base_dir } = cli.command {
            assert_eq!(user_id, "user-1");
            assert!(base_dir.is_none());
        } else {
            panic!("Expected Install command");
        }
    }

    #[test]
    fn test_install_with_base_dir() {
        let cli = Cli::parse_from([
            "focusflow-lifecycle",
            "install",
            "user-1",
            "--base-dir",
            "/srv/plugins",
        ]);
        if let Command::Install { user_id, base_dir } = cli.command {
            assert_eq!(user_id, "user-1");
            assert_eq!(base_dir, Some(PathBuf::from("/srv/plugins")));
        } else {
            panic!("Expected Install command");
        }
    }

    #[test]
    fn test_status_command() {
        let cli = Cli::parse_from(["focusflow-lifecycle", "status", "user-1"]);
        if let Command::Status { user_id, base_dir } = cli.command {
            assert_eq!(user_id, "user-1");
            assert!(base_dir.is_none());
        } else {
            panic!("Expected Status command");
        }
    }

    #[test]
    fn test_validate_defaults_to_current_dir() {
        let cli = Cli::parse_from(["focusflow-lifecycle", "validate"]);
        if let Command::Validate { dir } = cli.command {
            assert_eq!(dir, PathBuf::from("."));
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_validate_with_dir() {
        let cli = Cli::parse_from(["focusflow-lifecycle", "validate", "/tmp/bundle"]);
        if let Command::Validate { dir } = cli.command {
            assert_eq!(dir, PathBuf::from("/tmp/bundle"));
        } else {
            panic!("Expected Validate command");
        }
    }
}
