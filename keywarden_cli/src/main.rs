//! Keywarden command line interface
//!
//! Stands in for the chat front end: the same per-tenant operations the
//! Discord command surface exposes, backed by the file repository and the
//! real fallback dispatcher.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use keywarden_core::{CredentialCipher, Dispatcher, FileRepository, MasterKey, TenantStore};
use std::path::PathBuf;
use std::sync::Arc;

use commands::Command;
use config::AppConfig;

#[derive(Parser)]
#[command(name = "keywarden", version, about = "Per-tenant encrypted API key store and AI dispatch")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    // The master key is a fatal startup condition: nothing else may be
    // constructed without it.
    let master_key = MasterKey::from_env().context("encryption key validation failed")?;
    let cipher = CredentialCipher::new(&master_key);

    let repository = Arc::new(
        FileRepository::open(config.storage.data_path.clone())
            .await
            .context("failed to open tenant storage")?,
    );
    let store = Arc::new(TenantStore::new(repository, cipher));
    let dispatcher = Dispatcher::with_http_client(store.clone(), &config.dispatch_config());

    commands::run(cli.command, store, dispatcher).await
}
