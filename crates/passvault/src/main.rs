// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passvault - a password vault backend.
//!
//! This is the binary entry point: the HTTP server plus operator commands
//! for keys and principals.

mod keygen;
mod prompt;
mod serve;
mod shutdown;
mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use passvault_config::PassvaultConfig;

/// Passvault - a password vault backend.
#[derive(Parser, Debug)]
#[command(name = "passvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the REST API server.
    Serve,
    /// Print a fresh base64 process key for `PASSVAULT_VAULT_KEY`.
    Keygen,
    /// Manage principals.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Create a principal. The password comes from
    /// `PASSVAULT_USER_PASSWORD` or an interactive prompt.
    Create {
        /// Login email.
        #[arg(long)]
        email: String,
        /// Unique handle.
        #[arg(long)]
        handle: String,
        #[arg(long)]
        staff: bool,
        #[arg(long)]
        superuser: bool,
    },
    /// Deactivate a principal. Its records are kept; its tokens stop working.
    Deactivate {
        /// Login email.
        #[arg(long)]
        email: String,
    },
    /// Delete a principal together with all of its records.
    Delete {
        /// Login email.
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Load and validate configuration, then print it with secrets redacted.
    Check,
}

fn load_config(path: Option<&std::path::Path>) -> PassvaultConfig {
    let loaded = match path {
        Some(path) => passvault_config::load_and_validate_path(path),
        None => passvault_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            passvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Keygen needs no configuration.
    if let Some(Commands::Keygen) = cli.command {
        if let Err(e) = keygen::run_keygen() {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let config = load_config(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::User { action }) => {
            serve::init_tracing(&config.server.log_level);
            match action {
                UserCommands::Create {
                    email,
                    handle,
                    staff,
                    superuser,
                } => user::run_create(&config, email, handle, staff, superuser).await,
                UserCommands::Deactivate { email } => user::run_deactivate(&config, &email).await,
                UserCommands::Delete { email } => user::run_delete(&config, &email).await,
            }
        }
        Some(Commands::Config {
            action: ConfigCommands::Check,
        }) => {
            println!("configuration OK");
            println!("{config:#?}");
            Ok(())
        }
        Some(Commands::Keygen) => Ok(()),
        None => {
            println!("passvault: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
