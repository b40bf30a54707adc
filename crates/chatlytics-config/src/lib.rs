// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Chatlytics.
//!
//! TOML configuration with strict validation (`deny_unknown_fields`), XDG
//! file hierarchy lookup, `CHATLYTICS_*` environment overrides, and
//! diagnostic rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use chatlytics_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("search cluster: {}", config.search.url);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ChatlyticsConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error, the TOML sources are re-read so diagnostics can point
/// at the offending key.
pub fn load_and_validate() -> Result<ChatlyticsConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<ChatlyticsConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = read_source(path).into_iter().collect::<Vec<_>>();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ChatlyticsConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn read_source(path: &Path) -> Option<(String, String)> {
    std::fs::read_to_string(path)
        .ok()
        .map(|content| (path.display().to_string(), content))
}

fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_CONFIG_PATH))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_PATH.into());

    [
        local,
        loader::user_config_path(),
        Path::new(loader::SYSTEM_CONFIG_PATH).to_path_buf(),
    ]
    .iter()
    .filter_map(|path| read_source(path))
    .collect()
}
