pub mod amount;
pub mod args;
pub mod backend;
pub mod catalog;
mod commands;
pub mod notify;
pub mod orchestrator;
pub mod repeat;

use std::sync::Arc;

use alloy::primitives::Address;
use args::{Args, Command};
use key_store::{JsonFileKeyStore, KeyStore};
use snafu::prelude::*;
use tracing::debug;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Logger error: {}", source))]
    Logger {
        source: blockchain_utils::InitLoggerError,
    },

    #[snafu(display("Key store error: {}", source))]
    KeyStore { source: key_store::Error },

    #[snafu(display("Invalid account key: {}", source))]
    Secret { source: swap_models::AccountError },

    #[snafu(display("LI.FI client error: {}", source))]
    Lifi {
        #[snafu(source(from(lifi_client::Error, Box::new)))]
        source: Box<lifi_client::Error>,
    },

    #[snafu(display("Unknown chain {chain_id}"))]
    UnknownChain { chain_id: u64 },

    #[snafu(display("Token {token} not found on chain {chain_id}"))]
    UnknownToken { chain_id: u64, token: Address },

    #[snafu(display("No stored account has address {address}"))]
    UnknownAccount { address: Address },

    #[snafu(display("Failed to read key from stdin: {}", source))]
    Stdin { source: std::io::Error },

    #[snafu(display("Swap task error: {}", source))]
    Task { source: tokio::task::JoinError },

    #[snafu(display("Swaps finished with {failed} failed account(s), rejected: {rejected}"))]
    SwapsFailed { failed: usize, rejected: bool },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn open_store(args: &Args) -> Result<Arc<dyn KeyStore>> {
    let path = match &args.key_file {
        Some(path) => path.clone(),
        None => JsonFileKeyStore::default_path().context(KeyStoreSnafu)?,
    };
    let store = JsonFileKeyStore::open(path).context(KeyStoreSnafu)?;
    debug!(path = %store.path().display(), "opened key store");
    Ok(Arc::new(store))
}

pub async fn run(args: Args) -> Result<()> {
    match args.command.clone() {
        Command::Accounts { command } => {
            let store = open_store(&args)?;
            commands::accounts(&args, store.as_ref(), command).await
        }
        Command::Chains => commands::chains(&args).await,
        Command::Tokens { chain } => commands::tokens(&args, chain).await,
        Command::Swap(swap) => {
            let store = open_store(&args)?;
            commands::swap(&args, store, swap).await
        }
    }
}
