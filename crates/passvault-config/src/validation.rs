// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and minimum secret lengths.

use crate::diagnostic::ConfigError;
use crate::model::PassvaultConfig;

/// Minimum length of the token signing secret in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
///
/// Secrets are only checked when present. Commands that need them
/// (`serve`) fail separately when they are absent.
pub fn validate_config(config: &PassvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be between 1 and 65535".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.log_level `{}` is not one of: {}",
                config.server.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(key) = &config.vault.key
        && key.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "vault.key must not be empty when set".to_string(),
        });
    }

    if let Some(secret) = &config.auth.jwt_secret
        && secret.len() < MIN_JWT_SECRET_LEN
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes, got {}",
                secret.len()
            ),
        });
    }

    if config.auth.access_token_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "auth.access_token_ttl_secs must be greater than zero".to_string(),
        });
    }

    if config.auth.refresh_token_ttl_secs <= config.auth.access_token_ttl_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "auth.refresh_token_ttl_secs ({}) must exceed auth.access_token_ttl_secs ({})",
                config.auth.refresh_token_ttl_secs, config.auth.access_token_ttl_secs
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn default_config_validates() {
        let config = PassvaultConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = PassvaultConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(messages(&errors)[0].contains("database_path"));
    }

    #[test]
    fn short_jwt_secret_fails_validation() {
        let mut config = PassvaultConfig::default();
        config.auth.jwt_secret = Some("too-short".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("auth.jwt_secret"));
    }

    #[test]
    fn invalid_host_and_log_level_are_both_reported() {
        let mut config = PassvaultConfig::default();
        config.server.host = "not a host!".to_string();
        config.server.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn refresh_ttl_must_exceed_access_ttl() {
        let mut config = PassvaultConfig::default();
        config.auth.refresh_token_ttl_secs = 60;
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("refresh_token_ttl_secs"));
    }

    #[test]
    fn blank_vault_key_fails_validation() {
        let mut config = PassvaultConfig::default();
        config.vault.key = Some("   ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("vault.key"));
    }
}
