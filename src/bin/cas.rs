// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! Main CAS executable.
//!
//! This is the entry point of the `cas` binary hosting the ticket registry
//! and its cleaner.
use clap::Parser;
use color_eyre::eyre::{Report, Result};
use eyre::{WrapErr, eyre};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use secrecy::ExposeSecret;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{signal, spawn};
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, error, info};
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    prelude::*,
};

use cas_core::config::Config;
use cas_core::plugin_manager::PluginManager;
use cas_core::provider::Provider;
use cas_core::registry::cleaner::run_cleaner;
use cas_core::server::{Server, ServerState};

/// Central Authentication Service.
///
/// Ticket-granting and validation core of the CAS single sign-on server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CAS config file.
    #[arg(short, long, default_value = "/etc/cas/cas.conf")]
    config: PathBuf,

    /// Verbosity level. Repeat to increase level.
    #[arg(short, long, global=true, action = clap::ArgAction::Count, display_order = 920)]
    pub verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let args = Args::parse();

    let filter = Targets::new()
        .with_default(match args.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        })
        .with_target("sqlx", Level::WARN)
        .with_target("hyper_util", Level::INFO);

    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter);

    // build the tracing registry
    tracing_subscriber::registry().with(log_layer).init();

    info!("Starting CAS...");

    let token = CancellationToken::new();
    let cloned_token = token.clone();

    let cfg = Config::new(args.config)?;

    let conn = if cfg.registry.driver == "sql" {
        let connection = cfg
            .database
            .get_connection()
            .ok_or_else(|| eyre!("[database] connection is required by the sql ticket registry"))?;
        let opt: ConnectOptions = ConnectOptions::new(connection.expose_secret())
            // Prevent dumping the password in plaintext.
            .sqlx_logging(false)
            .to_owned();

        debug!("Establishing the database connection...");
        Database::connect(opt)
            .await
            .wrap_err("Database connection failed")?
    } else {
        DatabaseConnection::Disconnected
    };

    let plugin_manager = PluginManager::default();

    let provider = Provider::new(cfg.clone(), plugin_manager)?;

    let shared_state = Arc::new(Server::new(cfg, conn, provider));

    let cleaner = spawn(run_cleaner(shared_state.clone(), cloned_token));

    shutdown_signal(shared_state).await;

    token.cancel();
    cleaner.await?;
    Ok(())
}

/// Wait for the shutdown or interrupt signal
async fn shutdown_signal(state: ServerState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .inspect_err(|e| error!("failed to install Ctrl+C handler: {e}"))
            .ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = signal::unix::signal(signal::unix::SignalKind::terminate())
            .inspect_err(|e| error!("failed to install signal handler: {e}"))
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {state.terminate().await.ok();},
        () = terminate => {state.terminate().await.ok();},
    }
}
