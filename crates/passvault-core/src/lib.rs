// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Passvault credential vault.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Passvault workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CodecError, PassvaultError};
pub use types::{
    timestamp_after, timestamp_now, CredentialPatch, HealthStatus, Principal, PrincipalCredentials, PrincipalId,
    RecordId, StoredCredential,
};

pub use traits::{AuthAdapter, PluginAdapter, StorageAdapter};
