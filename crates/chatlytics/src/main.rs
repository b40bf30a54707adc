// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatlytics - descriptor-driven analytics over a chat message log.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod adapters;
mod compute;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use chatlytics_config::{ChatlyticsConfig, ConfigError};

/// Chatlytics - descriptor-driven analytics over a chat message log.
#[derive(Parser, Debug)]
#[command(name = "chatlytics", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the REST gateway and the recompute scheduler.
    Serve,
    /// Build and compute one descriptor document, printing the result JSON.
    Compute {
        /// Path to a descriptor JSON file.
        descriptor: PathBuf,
    },
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<ChatlyticsConfig, Vec<ConfigError>> {
    match path {
        Some(path) => chatlytics_config::load_and_validate_path(path),
        None => chatlytics_config::load_and_validate(),
    }
}

/// Default filter directives when `RUST_LOG` is unset.
fn default_log_directives(log_level: &str) -> String {
    format!("chatlytics={log_level},warn")
}

/// Logs go to stderr so `compute` output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directives(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            chatlytics_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let outcome = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Compute { descriptor }) => compute::run_compute(&config, &descriptor).await,
        Some(Commands::CheckConfig) => {
            println!(
                "chatlytics: config OK (service.name={}, search.url={}, gateway={}:{})",
                config.service.name, config.search.url, config.gateway.host, config.gateway.port
            );
            Ok(())
        }
        None => {
            println!("chatlytics: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc answers epoch/stats queries.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn default_directives_scope_level_to_chatlytics_crates() {
        assert_eq!(default_log_directives("debug"), "chatlytics=debug,warn");
        let filter = tracing_subscriber::EnvFilter::try_new(default_log_directives("info"));
        assert!(filter.is_ok());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compute_takes_descriptor_path_and_global_config() {
        let cli = Cli::try_parse_from([
            "chatlytics",
            "compute",
            "users.json",
            "--config",
            "/tmp/chatlytics.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/chatlytics.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Compute { descriptor }) if descriptor == PathBuf::from("users.json")
        ));
    }

    #[test]
    fn explicit_config_file_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatlytics.toml");
        std::fs::write(&path, "[scheduler]\nworkers = 0\n").unwrap();

        let errors = load_config(Some(&path)).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::Validation { .. }))
        );
    }
}
