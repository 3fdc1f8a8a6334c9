use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use snafu::{OptionExt, ResultExt};
use stargate_router::{
    decode_native_fee, min_amount, pool_id, quote_fee_calldata, swap_calldata,
    swap_eth_calldata, PoolSwap,
};
use swap_chains::ChainAccount;
use tracing::{debug, info};

use super::{
    BackendError, ChainSnafu, FeeQuoteSnafu, PlannedSwap, SwapBackend, SwapReceipt, SwapRequest,
    UnsupportedSnafu,
};

pub const DEFAULT_BRIDGE_SLIPPAGE_BPS: u16 = 50;

/// Swaps straight through the Stargate router deployed on the source chain.
/// Chain ids in the catalog are LayerZero ids.
#[derive(Debug, Clone)]
pub struct BridgeBackend {
    slippage_bps: u16,
}

impl BridgeBackend {
    pub fn new(slippage_bps: u16) -> Self {
        Self { slippage_bps }
    }
}

impl Default for BridgeBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGE_SLIPPAGE_BPS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    /// `RouterETH.swapETH`, paying `amount + fee`.
    Native { router_eth: Address },
    /// `Router.swap`, paying the fee only.
    Pool {
        router: Address,
        src_pool_id: u64,
        dst_pool_id: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgePlan {
    pub call: BridgeCall,
    pub dst_chain_id: u16,
    pub native_fee: U256,
    pub min_amount: U256,
}

impl BridgePlan {
    fn transaction(&self, request: &SwapRequest<'_>, refund: Address) -> TransactionRequest {
        match self.call {
            BridgeCall::Native { router_eth } => TransactionRequest::default()
                .with_to(router_eth)
                .with_input(swap_eth_calldata(
                    self.dst_chain_id,
                    refund,
                    request.recipient,
                    request.amount,
                    self.min_amount,
                ))
                .with_value(request.amount.saturating_add(self.native_fee)),
            BridgeCall::Pool {
                router,
                src_pool_id,
                dst_pool_id,
            } => TransactionRequest::default()
                .with_to(router)
                .with_input(swap_calldata(&PoolSwap {
                    dst_chain_id: self.dst_chain_id,
                    src_pool_id,
                    dst_pool_id,
                    refund,
                    recipient: request.recipient,
                    amount: request.amount,
                    min_amount: self.min_amount,
                }))
                .with_value(self.native_fee),
        }
    }
}

/// Works out which router entry point a request needs, before any chain call.
fn select_call(request: &SwapRequest<'_>) -> Result<(BridgeCall, Address), BackendError> {
    let contracts = request
        .from_chain
        .bridge_contracts
        .context(UnsupportedSnafu {
            reason: format!("{} has no Stargate router", request.from_chain.name),
        })?;

    if request.from_token.is_native() {
        let router_eth = contracts.router_eth.context(UnsupportedSnafu {
            reason: format!("{} has no native-coin router", request.from_chain.name),
        })?;
        return Ok((BridgeCall::Native { router_eth }, contracts.router));
    }

    let src_pool_id = pool_id(&request.from_token.symbol).context(UnsupportedSnafu {
        reason: format!("no Stargate pool for {}", request.from_token.symbol),
    })?;
    let to_symbol = request
        .to_token_descriptor
        .map(|token| token.symbol.as_str())
        .context(UnsupportedSnafu {
            reason: format!("destination token {} is not in the catalog", request.to_token),
        })?;
    let dst_pool_id = pool_id(to_symbol).context(UnsupportedSnafu {
        reason: format!("no Stargate pool for {to_symbol}"),
    })?;

    Ok((
        BridgeCall::Pool {
            router: contracts.router,
            src_pool_id,
            dst_pool_id,
        },
        contracts.router,
    ))
}

#[async_trait]
impl SwapBackend for BridgeBackend {
    type Plan = BridgePlan;

    fn name(&self) -> &'static str {
        "stargate"
    }

    async fn plan(
        &self,
        account: &dyn ChainAccount,
        request: &SwapRequest<'_>,
    ) -> Result<PlannedSwap<BridgePlan>, BackendError> {
        let dst_chain_id = u16::try_from(request.to_chain_id).map_err(|_| BackendError::Unsupported {
            reason: format!("{} is not a LayerZero chain id", request.to_chain_id),
        })?;
        let (call, router) = select_call(request)?;

        let quote = TransactionRequest::default()
            .with_to(router)
            .with_input(quote_fee_calldata(dst_chain_id, request.recipient));
        let returned = account.call(quote).await.context(ChainSnafu)?;
        let native_fee = decode_native_fee(&returned).context(FeeQuoteSnafu)?;
        debug!(dst_chain_id, %native_fee, "layerzero fee quoted");

        Ok(PlannedSwap {
            spender: router,
            approval_amount: request.amount,
            plan: BridgePlan {
                call,
                dst_chain_id,
                native_fee,
                min_amount: min_amount(request.amount, self.slippage_bps),
            },
        })
    }

    async fn execute(
        &self,
        account: &dyn ChainAccount,
        request: &SwapRequest<'_>,
        plan: BridgePlan,
    ) -> Result<SwapReceipt, BackendError> {
        let tx = plan.transaction(request, account.address());
        let tx_hash = account.send_transaction(tx).await.context(ChainSnafu)?;
        info!(%tx_hash, dst_chain_id = plan.dst_chain_id, "bridge swap mined");
        Ok(SwapReceipt {
            tx_hash: Some(tx_hash),
        })
    }
}
