// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide encryption key.
//!
//! Exactly one key exists per process. It is loaded once at startup from
//! configuration and handed to the codec explicitly; there is no global.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use passvault_config::model::VaultConfig;
use passvault_core::PassvaultError;
use zeroize::Zeroizing;

use crate::crypto;

/// Environment variable that normally carries the key.
pub const VAULT_KEY_ENV_VAR: &str = "PASSVAULT_VAULT_KEY";

/// Key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// The symmetric key used to seal and open every envelope.
///
/// Debug output intentionally omits the key bytes.
pub struct ProcessKey {
    bytes: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for ProcessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl ProcessKey {
    /// Load the key from the `[vault]` configuration section.
    ///
    /// Fails with [`PassvaultError::Config`] when the key is absent, empty,
    /// not base64, or not exactly 32 bytes.
    pub fn from_config(config: &VaultConfig) -> Result<Self, PassvaultError> {
        match config.key.as_deref().map(str::trim) {
            None | Some("") => Err(PassvaultError::Config(format!(
                "vault.key is not set; provide a base64-encoded 32-byte key via {VAULT_KEY_ENV_VAR} \
                 (generate one with `passvault keygen`)"
            ))),
            Some(encoded) => {
                let key = Self::from_base64(encoded)?;
                tracing::debug!("process key loaded");
                Ok(key)
            }
        }
    }

    /// Decode a key from standard or URL-safe base64, with or without padding.
    pub fn from_base64(encoded: &str) -> Result<Self, PassvaultError> {
        let normalized: Zeroizing<String> = Zeroizing::new(
            encoded
                .trim()
                .trim_end_matches('=')
                .chars()
                .map(|c| match c {
                    '+' => '-',
                    '/' => '_',
                    other => other,
                })
                .collect(),
        );

        let decoded = Zeroizing::new(
            URL_SAFE_NO_PAD
                .decode(normalized.as_bytes())
                .map_err(|_| PassvaultError::Config("vault.key is not valid base64".to_string()))?,
        );

        Self::from_slice(&decoded)
    }

    /// Build a key from raw bytes. The slice must be exactly 32 bytes long.
    pub fn from_slice(raw: &[u8]) -> Result<Self, PassvaultError> {
        if raw.len() != KEY_LEN {
            return Err(PassvaultError::Config(format!(
                "vault.key must decode to exactly {KEY_LEN} bytes, got {}",
                raw.len()
            )));
        }
        let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
        bytes.copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// Generate a fresh random key from the system CSPRNG.
    pub fn generate() -> Result<Self, PassvaultError> {
        Ok(Self {
            bytes: crypto::generate_random_key()?,
        })
    }

    /// URL-safe base64 (no padding) encoding, as accepted by [`from_base64`](Self::from_base64).
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(URL_SAFE_NO_PAD.encode(self.bytes.as_slice()))
    }

    pub(crate) fn bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn generated_key_roundtrips_through_base64() {
        let key = ProcessKey::generate().unwrap();
        let encoded = key.to_base64();
        let decoded = ProcessKey::from_base64(&encoded).unwrap();
        assert_eq!(key.bytes(), decoded.bytes());
    }

    #[test]
    fn standard_padded_base64_is_accepted() {
        let raw = [7u8; KEY_LEN];
        let encoded = STANDARD.encode(raw);
        assert!(encoded.ends_with('='));
        let key = ProcessKey::from_base64(&encoded).unwrap();
        assert_eq!(key.bytes(), &raw);
    }

    #[test]
    fn missing_key_is_config_error() {
        let err = ProcessKey::from_config(&VaultConfig::default()).unwrap_err();
        assert!(matches!(err, PassvaultError::Config(msg) if msg.contains(VAULT_KEY_ENV_VAR)));
    }

    #[test]
    fn empty_key_is_config_error() {
        let config = VaultConfig {
            key: Some("  ".to_string()),
        };
        assert!(matches!(
            ProcessKey::from_config(&config),
            Err(PassvaultError::Config(_))
        ));
    }

    #[test]
    fn invalid_base64_is_config_error() {
        assert!(matches!(
            ProcessKey::from_base64("not base64 at all!"),
            Err(PassvaultError::Config(_))
        ));
    }

    #[test]
    fn wrong_length_is_config_error() {
        let short = URL_SAFE_NO_PAD.encode([1u8; 16]);
        let err = ProcessKey::from_base64(&short).unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn debug_redacts_key_bytes() {
        let key = ProcessKey::from_slice(&[0xAB; KEY_LEN]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("171"));
    }
}
