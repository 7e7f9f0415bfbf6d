// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier - multi-channel notification delivery.
//!
//! This is the binary entry point: the long-running `serve` command and a
//! handful of one-shot commands that reuse the same wiring.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;
mod shutdown;
mod wiring;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use courier_config::CourierConfig;
use courier_core::{Category, Channel, CourierError};

/// Courier - deliver notifications over WhatsApp with SMS failover.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway.
    Serve,
    /// Deliver one message and print the delivery record.
    Send {
        /// Recipient phone number, in any common format.
        #[arg(long)]
        to: String,
        #[arg(long)]
        body: String,
        /// emergency, notification, reminder or info.
        #[arg(long, default_value = "info")]
        category: Category,
        /// Channel to try first while online (whatsapp or sms).
        #[arg(long)]
        prefer: Option<Channel>,
    },
    /// Print recent delivery records, newest first.
    History {
        #[arg(long)]
        recipient: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Check a provider message identifier.
    ValidateIdentifier { sid: String },
    /// Print the canonical form of a phone number.
    Normalize { number: String },
    /// Validate configuration and report which channels are usable.
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => courier_config::load_and_validate_path(path),
        None => courier_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            courier_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    serve::init_tracing(&config.service.log_level);

    match run(cli.command, config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: CourierConfig) -> Result<u8, CourierError> {
    match command {
        Commands::Serve => serve::run_serve(config).await.map(|()| commands::OK),
        Commands::Send {
            to,
            body,
            category,
            prefer,
        } => commands::run_send(&config, to, body, category, prefer).await,
        Commands::History {
            recipient,
            limit,
            offset,
        } => commands::run_history(&config, recipient, limit, offset).await,
        Commands::ValidateIdentifier { sid } => commands::run_validate_identifier(&config, &sid),
        Commands::Normalize { number } => Ok(commands::run_normalize(&config, &number)),
        Commands::CheckConfig => commands::run_check_config(&config),
    }
}
