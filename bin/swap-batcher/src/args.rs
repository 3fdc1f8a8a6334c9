use std::{path::PathBuf, str::FromStr, time::Duration};

use alloy::primitives::Address;
use clap::{Parser, Subcommand, ValueEnum};
use lifi_client::{RouteOptions, RouteOrder, MAINNET_API_URL};
use rust_decimal::Decimal;
use swap_models::{AccountSecret, AmountMode, SwapIntent};
use url::Url;

use crate::backend::DEFAULT_BRIDGE_SLIPPAGE_BPS;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// LI.FI aggregator routes, keyed by EVM chain id
    #[value(alias = "lifi")]
    Aggregator,
    /// Stargate testnet routers, keyed by LayerZero chain id
    #[value(alias = "stargate")]
    Bridge,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOrderArg {
    Recommended,
    Fastest,
    Cheapest,
    Safest,
}

impl From<RouteOrderArg> for RouteOrder {
    fn from(order: RouteOrderArg) -> Self {
        match order {
            RouteOrderArg::Recommended => RouteOrder::Recommended,
            RouteOrderArg::Fastest => RouteOrder::Fastest,
            RouteOrderArg::Cheapest => RouteOrder::Cheapest,
            RouteOrderArg::Safest => RouteOrder::Safest,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "swap-batcher")]
#[command(about = "Batch cross-chain token swaps from many accounts")]
pub struct Args {
    /// Path to .env file to load environment variables from
    #[arg(long, env = "ENV_FILE", global = true)]
    pub env_file: Option<PathBuf>,

    /// Global log level (e.g. trace, debug, info)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Account key file (defaults to the platform data directory)
    #[arg(long, env = "SWAP_BATCHER_KEY_FILE", global = true)]
    pub key_file: Option<PathBuf>,

    /// Where chains and tokens come from and how swaps are executed
    #[arg(long, env = "SWAP_BACKEND", value_enum, default_value_t = BackendArg::Aggregator, global = true)]
    pub backend: BackendArg,

    /// LI.FI API base URL (production or staging)
    #[arg(long, env = "LIFI_API_URL", default_value = MAINNET_API_URL, global = true)]
    pub lifi_api_url: Url,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Manage stored accounts
    Accounts {
        #[command(subcommand)]
        command: AccountsCommand,
    },
    /// List chains of the selected backend
    Chains,
    /// List tokens on one chain
    Tokens {
        #[arg(long)]
        chain: u64,
    },
    /// Swap from every selected account
    Swap(SwapArgs),
}

#[derive(Subcommand, Debug, Clone)]
pub enum AccountsCommand {
    /// Add an account by private key, read from stdin when omitted
    Add {
        #[arg(value_parser = parse_secret)]
        secret: Option<AccountSecret>,
    },
    /// Remove every account with this address
    Remove {
        #[arg(value_parser = parse_address)]
        address: Address,
    },
    /// Include an account in swaps
    Select {
        #[arg(value_parser = parse_address)]
        address: Address,
    },
    /// Exclude an account from swaps
    Deselect {
        #[arg(value_parser = parse_address)]
        address: Address,
    },
    /// Show accounts, optionally with their balance of one token
    List {
        #[arg(long, requires = "token")]
        chain: Option<u64>,

        #[arg(long, requires = "chain", value_parser = parse_address)]
        token: Option<Address>,

        /// Replaces the catalog RPC endpoint for `--chain`
        #[arg(long, env = "RPC_URL")]
        rpc_url: Option<Url>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SwapArgs {
    #[arg(long, env = "FROM_CHAIN")]
    pub from_chain: u64,

    #[arg(long, env = "TO_CHAIN")]
    pub to_chain: u64,

    /// Source token address; the zero address is the native coin
    #[arg(long, env = "FROM_TOKEN", value_parser = parse_address)]
    pub from_token: Address,

    #[arg(long, env = "TO_TOKEN", value_parser = parse_address)]
    pub to_token: Address,

    /// Whole tokens sent by each account (e.g. "0.5")
    #[arg(long, env = "AMOUNT", value_parser = parse_amount, conflicts_with = "random_percent")]
    pub amount: Option<Decimal>,

    /// Send a random share of each balance, up to this many percent
    #[arg(long, env = "RANDOM_PERCENT", value_parser = parse_percent)]
    pub random_percent: Option<f64>,

    /// Run again after this delay, expressed with humantime syntax (e.g. "30m"); "0s" runs once
    #[arg(long, env = "REPEAT", value_parser = parse_duration)]
    pub repeat: Option<Duration>,

    /// Replaces the catalog RPC endpoint for the source chain
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<Url>,

    /// LI.FI slippage as a fraction (0.05 is 5%)
    #[arg(long, env = "LIFI_SLIPPAGE", default_value_t = 0.05, value_parser = parse_fraction)]
    pub slippage: f64,

    #[arg(long, env = "LIFI_ROUTE_ORDER", value_enum, default_value_t = RouteOrderArg::Recommended)]
    pub route_order: RouteOrderArg,

    /// Stargate minimum-received slippage in basis points
    #[arg(long, env = "BRIDGE_SLIPPAGE_BPS", default_value_t = DEFAULT_BRIDGE_SLIPPAGE_BPS, value_parser = clap::value_parser!(u16).range(0..=10_000))]
    pub bridge_slippage_bps: u16,

    /// Confirmations to wait for on every transaction
    #[arg(long, env = "CONFIRMATIONS", default_value_t = 1)]
    pub confirmations: u64,

    /// Maximum time to wait for a transaction receipt
    #[arg(long, env = "RECEIPT_TIMEOUT", default_value = "5m", value_parser = parse_duration)]
    pub receipt_timeout: Duration,

    /// Polling cadence for cross-chain transfer status
    #[arg(long, env = "STATUS_POLL_INTERVAL", default_value = "10s", value_parser = parse_duration)]
    pub status_poll_interval: Duration,

    /// Maximum time to wait for a cross-chain transfer to arrive
    #[arg(long, env = "STATUS_TIMEOUT", default_value = "30m", value_parser = parse_duration)]
    pub status_timeout: Duration,
}

impl SwapArgs {
    pub fn intent(&self) -> SwapIntent {
        let amount_mode = match (self.random_percent, self.amount) {
            (Some(range), _) => Some(AmountMode::RandomPercent(range)),
            (None, Some(value)) => Some(AmountMode::Fixed(value)),
            (None, None) => None,
        };

        SwapIntent {
            from_chain: self.from_chain,
            to_chain: self.to_chain,
            from_token: self.from_token,
            to_token: self.to_token,
            amount_mode,
            repeat_interval: self.repeat.filter(|interval| !interval.is_zero()),
        }
    }

    pub fn route_options(&self) -> RouteOptions {
        RouteOptions {
            slippage: self.slippage,
            order: self.route_order.into(),
            ..RouteOptions::default()
        }
    }
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|err| err.to_string())
}

fn parse_address(value: &str) -> Result<Address, String> {
    Address::from_str(value.trim()).map_err(|e| e.to_string())
}

fn parse_secret(value: &str) -> Result<AccountSecret, String> {
    AccountSecret::parse(value).map_err(|e| e.to_string())
}

fn parse_amount(value: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(value.trim()).map_err(|e| e.to_string())?;
    if amount.is_sign_negative() {
        return Err("amount must not be negative".to_string());
    }
    Ok(amount)
}

fn parse_percent(value: &str) -> Result<f64, String> {
    let percent: f64 = value.trim().parse().map_err(|_| format!("invalid percentage: {value}"))?;
    if !(0.0..=100.0).contains(&percent) {
        return Err("percentage must be between 0 and 100".to_string());
    }
    Ok(percent)
}

fn parse_fraction(value: &str) -> Result<f64, String> {
    let fraction: f64 = value.trim().parse().map_err(|_| format!("invalid fraction: {value}"))?;
    if !(0.0..=1.0).contains(&fraction) {
        return Err("slippage must be between 0 and 1".to_string());
    }
    Ok(fraction)
}
