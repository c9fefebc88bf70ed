// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM envelope encryption for the Passvault credential vault.
//!
//! A single process key, loaded once from configuration, seals every
//! credential secret into a self-describing envelope. Decryption fails
//! closed on any tampering.

pub mod codec;
pub mod crypto;
pub mod key;

pub use codec::{decrypt, encrypt, Envelope};
pub use key::{ProcessKey, VAULT_KEY_ENV_VAR};
