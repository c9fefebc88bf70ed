// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `passvault serve` command implementation.
//!
//! Loads the process key and JWT secret (both fatal when missing), opens
//! SQLite storage, and serves the REST API until SIGINT or SIGTERM.

use std::sync::Arc;

use passvault_auth::TokenIssuer;
use passvault_config::PassvaultConfig;
use passvault_core::{PassvaultError, PluginAdapter, StorageAdapter};
use passvault_gateway::{start_server, GatewayState};
use passvault_storage::SqliteStorage;
use passvault_vault::ProcessKey;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `passvault serve` command.
pub async fn run_serve(config: PassvaultConfig) -> Result<(), PassvaultError> {
    init_tracing(&config.server.log_level);
    info!("starting passvault serve");

    let key = ProcessKey::from_config(&config.vault).map_err(|e| {
        error!(error = %e, "process key unavailable");
        e
    })?;
    let issuer = TokenIssuer::from_config(&config.auth).map_err(|e| {
        error!(error = %e, "token issuer unavailable");
        e
    })?;

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };
    info!(path = %config.storage.database_path, "storage ready");

    let state = GatewayState::new(storage.clone(), Arc::new(key), issuer)?;

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&config.server, state, cancel).await;

    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }
    served?;

    info!("passvault stopped");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("passvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
