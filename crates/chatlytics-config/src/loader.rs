// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy `./chatlytics.toml` > `~/.config/chatlytics/chatlytics.toml`
//! > `/etc/chatlytics/chatlytics.toml`, with `CHATLYTICS_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ChatlyticsConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/chatlytics/chatlytics.toml";
pub const LOCAL_CONFIG_PATH: &str = "chatlytics.toml";

/// Top-level sections, longest first so `task_manager_` wins over shorter prefixes.
const SECTIONS: &[&str] = &[
    "task_manager",
    "analytics",
    "scheduler",
    "service",
    "storage",
    "gateway",
    "search",
];

pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("chatlytics/chatlytics.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chatlytics/chatlytics.toml`
/// 3. `~/.config/chatlytics/chatlytics.toml`
/// 4. `./chatlytics.toml`
/// 5. `CHATLYTICS_*` environment variables
pub fn load_config() -> Result<ChatlyticsConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ChatlyticsConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatlyticsConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatlyticsConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatlyticsConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ChatlyticsConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `CHATLYTICS_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because both section and
/// key names contain underscores: `CHATLYTICS_TASK_MANAGER_API_KEY` must map
/// to `task_manager.api_key`.
fn env_provider() -> Env {
    Env::prefixed("CHATLYTICS_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("task_manager_api_key"), "task_manager.api_key");
        assert_eq!(map_env_key("search_messages_index"), "search.messages_index");
        assert_eq!(map_env_key("scheduler_interval_secs"), "scheduler.interval_secs");
        assert_eq!(map_env_key("gateway_bearer_token"), "gateway.bearer_token");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }
}
