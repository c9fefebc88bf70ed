// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `passvault keygen` command implementation.

use passvault_core::PassvaultError;
use passvault_vault::{ProcessKey, VAULT_KEY_ENV_VAR};

/// Print a new random process key.
///
/// The key goes to stdout alone so it can be piped into a secret store.
pub fn run_keygen() -> Result<(), PassvaultError> {
    let key = ProcessKey::generate()?;
    println!("{}", key.to_base64().as_str());
    eprintln!("set this as {VAULT_KEY_ENV_VAR}; records written under one key cannot be read with another");
    Ok(())
}
