use std::{io::BufRead, sync::Arc};

use alloy::primitives::Address;
use blockchain_utils::shutdown_signal;
use key_store::KeyStore;
use lifi_client::LifiClient;
use snafu::{ensure, OptionExt, ResultExt};
use swap_chains::{AccountConnector, EvmConnector};
use swap_models::{AccountSecret, ChainCatalog, SwapIntent};
use tracing::{info, warn};
use url::Url;
use zeroize::Zeroizing;

use crate::{
    args::{AccountsCommand, Args, BackendArg, SwapArgs},
    backend::{AggregatorBackend, BridgeBackend, SwapBackend},
    catalog::lifi_catalog,
    notify::ConsoleNotifier,
    orchestrator::SwapOrchestrator,
    repeat::{RepeatTask, RunSummary},
    KeyStoreSnafu, LifiSnafu, Result, SecretSnafu, StdinSnafu, SwapsFailedSnafu, TaskSnafu,
    UnknownAccountSnafu, UnknownChainSnafu, UnknownTokenSnafu,
};

pub(crate) async fn load_catalog(args: &Args) -> Result<ChainCatalog> {
    match args.backend {
        BackendArg::Bridge => Ok(ChainCatalog::stargate_testnet()),
        BackendArg::Aggregator => {
            let client = LifiClient::new(&args.lifi_api_url).context(LifiSnafu)?;
            lifi_catalog(&client).await.context(LifiSnafu)
        }
    }
}

fn override_rpc(catalog: &mut ChainCatalog, chain_id: u64, rpc_url: Option<&Url>) -> Result<()> {
    if let Some(rpc_url) = rpc_url {
        ensure!(
            catalog.override_rpc_url(chain_id, rpc_url.as_str()),
            UnknownChainSnafu { chain_id }
        );
        info!(chain_id, %rpc_url, "using RPC override");
    }
    Ok(())
}

/// Secret of the first stored account whose address is `address`.
fn secret_for(store: &dyn KeyStore, address: Address) -> Result<AccountSecret> {
    store
        .accounts()
        .context(KeyStoreSnafu)?
        .into_iter()
        .find(|account| account.address().ok() == Some(address))
        .map(|account| account.secret)
        .context(UnknownAccountSnafu { address })
}

fn read_secret_from_stdin() -> Result<AccountSecret> {
    let mut line = Zeroizing::new(String::new());
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context(StdinSnafu)?;
    AccountSecret::parse(&line).context(SecretSnafu)
}

pub(crate) async fn accounts(
    args: &Args,
    store: &dyn KeyStore,
    command: AccountsCommand,
) -> Result<()> {
    match command {
        AccountsCommand::Add { secret } => {
            let secret = match secret {
                Some(secret) => secret,
                None => read_secret_from_stdin()?,
            };
            let address = secret.address().context(SecretSnafu)?;
            store.add(secret).context(KeyStoreSnafu)?;
            println!("Added {address}");
        }
        AccountsCommand::Remove { address } => {
            let secret = secret_for(store, address)?;
            let removed = store.remove(&secret).context(KeyStoreSnafu)?;
            println!("Removed {removed} account(s) with address {address}");
        }
        AccountsCommand::Select { address } => set_selected(store, address, true)?,
        AccountsCommand::Deselect { address } => set_selected(store, address, false)?,
        AccountsCommand::List {
            chain,
            token,
            rpc_url,
        } => {
            let balances = match (chain, token) {
                (Some(chain), Some(token)) => Some((chain, token)),
                _ => None,
            };
            list_accounts(args, store, balances, rpc_url.as_ref()).await?;
        }
    }
    Ok(())
}

fn set_selected(store: &dyn KeyStore, address: Address, selected: bool) -> Result<()> {
    let secret = secret_for(store, address)?;
    store
        .set_selected(&secret, selected)
        .context(KeyStoreSnafu)?;
    let state = if selected { "selected" } else { "deselected" };
    println!("{address} {state}");
    Ok(())
}

async fn list_accounts(
    args: &Args,
    store: &dyn KeyStore,
    balances: Option<(u64, Address)>,
    rpc_url: Option<&Url>,
) -> Result<()> {
    let accounts = store.accounts().context(KeyStoreSnafu)?;
    if accounts.is_empty() {
        println!("No accounts");
        return Ok(());
    }

    let lookup = match balances {
        Some((chain_id, token)) => {
            let mut catalog = load_catalog(args).await?;
            override_rpc(&mut catalog, chain_id, rpc_url)?;
            let chain = catalog
                .chain(chain_id)
                .cloned()
                .context(UnknownChainSnafu { chain_id })?;
            let token = catalog
                .token(chain_id, token)
                .cloned()
                .context(UnknownTokenSnafu { chain_id, token })?;
            Some((chain, token))
        }
        None => None,
    };
    let connector = EvmConnector::default();

    for (index, account) in accounts.iter().enumerate() {
        let mark = if account.selected { "[x]" } else { "[ ]" };
        let address = match account.address() {
            Ok(address) => address.to_string(),
            Err(e) => format!("<invalid key: {e}>"),
        };

        let Some((chain, token)) = &lookup else {
            println!("{index:>3} {mark} {address}");
            continue;
        };
        let balance = match connector.connect(&account.secret, chain).await {
            Ok(client) => client.balance(token.address).await,
            Err(e) => Err(e),
        };
        match balance {
            Ok(balance) => println!(
                "{index:>3} {mark} {address} {} {}",
                token.format_amount(balance),
                token.symbol
            ),
            Err(e) => {
                warn!(index, "balance lookup failed: {e}");
                println!("{index:>3} {mark} {address} balance unavailable");
            }
        }
    }
    Ok(())
}

pub(crate) async fn chains(args: &Args) -> Result<()> {
    let catalog = load_catalog(args).await?;
    for chain in catalog.chains() {
        let bridge = if chain.bridge_contracts.is_some() {
            " (stargate)"
        } else {
            ""
        };
        println!("{:>8}  {}{bridge}  {}", chain.chain_id, chain.name, chain.rpc_url);
    }
    Ok(())
}

pub(crate) async fn tokens(args: &Args, chain_id: u64) -> Result<()> {
    let catalog = load_catalog(args).await?;
    ensure!(catalog.chain(chain_id).is_some(), UnknownChainSnafu { chain_id });
    for token in catalog.tokens(chain_id) {
        let kind = if token.is_native() { " (native)" } else { "" };
        println!(
            "{:<10} {} decimals={}{kind}",
            token.symbol, token.address, token.decimals
        );
    }
    Ok(())
}

pub(crate) async fn swap(args: &Args, store: Arc<dyn KeyStore>, swap: SwapArgs) -> Result<()> {
    let mut catalog = load_catalog(args).await?;
    override_rpc(&mut catalog, swap.from_chain, swap.rpc_url.as_ref())?;
    let catalog = Arc::new(catalog);
    let connector: Arc<dyn AccountConnector> = Arc::new(EvmConnector::new(
        swap.confirmations,
        Some(swap.receipt_timeout),
    ));
    let notifier = Arc::new(ConsoleNotifier);
    let intent = swap.intent();

    let summary = match args.backend {
        BackendArg::Aggregator => {
            let client = LifiClient::new(&args.lifi_api_url).context(LifiSnafu)?;
            let backend = AggregatorBackend::new(
                client,
                swap.route_options(),
                swap.status_poll_interval,
                swap.status_timeout,
            );
            run_until_shutdown(
                SwapOrchestrator::new(store, catalog, connector, backend, notifier),
                intent,
            )
            .await?
        }
        BackendArg::Bridge => {
            let backend = BridgeBackend::new(swap.bridge_slippage_bps);
            run_until_shutdown(
                SwapOrchestrator::new(store, catalog, connector, backend, notifier),
                intent,
            )
            .await?
        }
    };

    info!(
        cycles = summary.cycles,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "swap run complete"
    );
    ensure!(
        summary.is_success(),
        SwapsFailedSnafu {
            failed: summary.failed,
            rejected: summary.rejected
        }
    );
    Ok(())
}

async fn run_until_shutdown<B>(
    orchestrator: SwapOrchestrator<B>,
    intent: SwapIntent,
) -> Result<RunSummary>
where
    B: SwapBackend + 'static,
{
    RepeatTask::spawn(Arc::new(orchestrator), intent)
        .join_until(shutdown_signal())
        .await
        .context(TaskSnafu)
}
