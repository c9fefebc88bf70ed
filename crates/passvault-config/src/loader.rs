// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./passvault.toml` > `~/.config/passvault/passvault.toml`
//! > `/etc/passvault/passvault.toml` with environment variable overrides via
//! `PASSVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::{section_names, PassvaultConfig};

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/passvault/passvault.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "passvault.toml";

/// Per-user configuration file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("passvault").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/passvault/passvault.toml` (system-wide)
/// 3. `~/.config/passvault/passvault.toml` (user XDG config)
/// 4. `./passvault.toml` (local directory)
/// 5. `PASSVAULT_*` environment variables
pub fn load_config() -> Result<PassvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PassvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PassvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PassvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PassvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PassvaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// `Env::split("_")` would break keys that contain underscores:
/// `PASSVAULT_AUTH_JWT_SECRET` must map to `auth.jwt_secret`, not
/// `auth.jwt.secret`.
fn env_provider() -> Env {
    Env::prefixed("PASSVAULT_")
        // Consumed by `passvault user create`, not part of the config tree.
        .ignore(&["USER_PASSWORD"])
        .map(|key| {
            let mapped = map_env_key(key.as_str());
            mapped.into()
        })
}

/// Map a lowercased, prefix-stripped env var name to its dotted config path.
fn map_env_key(key: &str) -> String {
    for section in section_names() {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
