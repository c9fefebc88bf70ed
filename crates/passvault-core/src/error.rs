// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Passvault credential vault.

use std::collections::BTreeMap;

use thiserror::Error;

/// Failure modes of the envelope codec.
///
/// The two kinds are an internal diagnostic. Callers facing clients collapse
/// both into [`PassvaultError::RetrievalFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Authentication failed: wrong key, tampered bytes, or an envelope this
    /// codec did not produce.
    #[error("envelope failed authentication")]
    Integrity,

    /// The envelope is not a structurally valid encoded ciphertext.
    #[error("malformed envelope: {0}")]
    Format(&'static str),
}

impl CodecError {
    /// Short label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integrity => "integrity",
            Self::Format(_) => "format",
        }
    }
}

/// The primary error type used across all Passvault crates.
#[derive(Debug, Error)]
pub enum PassvaultError {
    /// Configuration errors (missing key, malformed values). Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Client-fixable input problems, with per-field detail.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, String>,
    },

    /// Missing, invalid, or expired credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The record is absent or owned by another principal.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Envelope could not be opened.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Generic secret retrieval failure surfaced to clients.
    #[error("secret could not be retrieved")]
    RetrievalFailed,

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PassvaultError {
    /// A validation error for a single field.
    pub fn invalid_field(field: &str, detail: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), detail.into());
        Self::invalid_fields(fields)
    }

    /// A validation error carrying every collected field problem.
    pub fn invalid_fields(fields: BTreeMap<String, String>) -> Self {
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        Self::Validation {
            message: format!("invalid input: {}", names.join(", ")),
            fields,
        }
    }

    /// Wrap any storage-layer error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
