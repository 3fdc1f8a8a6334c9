//! Ways of moving tokens from one chain to another.
//!
//! A backend first plans a swap, which tells the orchestrator which contract
//! must be allowed to spend the source token, and then executes the plan once
//! that allowance is in place.

mod aggregator;
mod bridge;

pub use aggregator::*;
pub use bridge::*;

use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use snafu::Snafu;
use swap_chains::ChainAccount;
use swap_models::{ChainDescriptor, TokenDescriptor};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BackendError {
    #[snafu(display("No available routes for this pair"))]
    NoRoute,

    #[snafu(display("LI.FI request failed: {source}"))]
    Lifi { source: lifi_client::Error },

    #[snafu(display("Chain interaction failed: {source}"))]
    Chain { source: swap_chains::Error },

    #[snafu(display("Route cannot be executed: {reason}"))]
    InvalidRoute { reason: String },

    #[snafu(display("Bridge does not support this swap: {reason}"))]
    Unsupported { reason: String },

    #[snafu(display("Could not decode bridge fee quote: {source}"))]
    FeeQuote { source: alloy::sol_types::Error },

    #[snafu(display("Transfer {tx_hash} failed on the destination side: {message}"))]
    RelayFailed { tx_hash: TxHash, message: String },

    #[snafu(display("Transfer {tx_hash} not confirmed after {timeout:?}"))]
    RelayTimeout { tx_hash: TxHash, timeout: Duration },
}

/// One account's swap, with the amount already resolved.
#[derive(Debug, Clone)]
pub struct SwapRequest<'a> {
    pub from_chain: &'a ChainDescriptor,
    pub from_token: &'a TokenDescriptor,
    pub to_chain_id: u64,
    pub to_token: Address,
    /// Present when the destination token is in the catalog.
    pub to_token_descriptor: Option<&'a TokenDescriptor>,
    pub amount: U256,
    pub recipient: Address,
}

/// What a backend needs approved before it can run `plan`.
#[derive(Debug, Clone)]
pub struct PlannedSwap<P> {
    pub spender: Address,
    pub approval_amount: U256,
    pub plan: P,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    /// Hash of the last transaction sent, when the backend exposes one.
    pub tx_hash: Option<TxHash>,
}

#[async_trait]
pub trait SwapBackend: Send + Sync {
    type Plan: Send + Sync;

    fn name(&self) -> &'static str;

    async fn plan(
        &self,
        account: &dyn ChainAccount,
        request: &SwapRequest<'_>,
    ) -> Result<PlannedSwap<Self::Plan>, BackendError>;

    async fn execute(
        &self,
        account: &dyn ChainAccount,
        request: &SwapRequest<'_>,
        plan: Self::Plan,
    ) -> Result<SwapReceipt, BackendError>;
}
