// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `passvault user` command implementations.

use std::sync::Arc;

use passvault_auth::{NewPrincipal, PrincipalDirectory};
use passvault_config::PassvaultConfig;
use passvault_core::{PassvaultError, StorageAdapter};
use passvault_storage::SqliteStorage;

use crate::prompt;

async fn open_directory(
    config: &PassvaultConfig,
) -> Result<(Arc<SqliteStorage>, PrincipalDirectory), PassvaultError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    Ok((storage.clone(), PrincipalDirectory::new(storage)))
}

/// `passvault user create`
pub async fn run_create(
    config: &PassvaultConfig,
    email: String,
    handle: String,
    is_staff: bool,
    is_superuser: bool,
) -> Result<(), PassvaultError> {
    let password = prompt::get_user_password_with_confirm()?;
    let (storage, directory) = open_directory(config).await?;

    let principal = directory
        .create(NewPrincipal {
            email,
            handle,
            password,
            is_staff,
            is_superuser,
        })
        .await?;
    storage.close().await?;

    println!("created principal {} ({})", principal.handle, principal.id);
    Ok(())
}

/// `passvault user deactivate`
pub async fn run_deactivate(config: &PassvaultConfig, email: &str) -> Result<(), PassvaultError> {
    let (storage, directory) = open_directory(config).await?;
    let principal = directory.deactivate(email).await?;
    storage.close().await?;

    println!("deactivated principal {} ({})", principal.handle, principal.id);
    Ok(())
}

/// `passvault user delete`
pub async fn run_delete(config: &PassvaultConfig, email: &str) -> Result<(), PassvaultError> {
    let (storage, directory) = open_directory(config).await?;
    let principal = directory.delete(email).await?;
    storage.close().await?;

    println!("deleted principal {} ({}) and its records", principal.handle, principal.id);
    Ok(())
}
