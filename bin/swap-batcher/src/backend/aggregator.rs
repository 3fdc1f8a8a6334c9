use std::time::Duration;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, TxHash},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use lifi_client::{
    LifiClient, Route, RouteOptions, RoutesRequest, StatusQuery, StatusResponse, Step,
    StepTransaction, TransferStatus,
};
use snafu::{ensure, OptionExt, ResultExt};
use swap_chains::{ensure_allowance, ChainAccount};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::{
    BackendError, ChainSnafu, InvalidRouteSnafu, LifiSnafu, NoRouteSnafu, PlannedSwap,
    RelayFailedSnafu, RelayTimeoutSnafu, SwapBackend, SwapReceipt, SwapRequest,
};

/// Source of cross-chain transfer status, the LI.FI `/status` endpoint in production.
#[async_trait]
pub(crate) trait TransferStatusSource: Send + Sync {
    async fn transfer_status(&self, query: &StatusQuery) -> lifi_client::Result<StatusResponse>;
}

#[async_trait]
impl TransferStatusSource for LifiClient {
    async fn transfer_status(&self, query: &StatusQuery) -> lifi_client::Result<StatusResponse> {
        self.get_status(query).await
    }
}

/// Polls `source` every `poll_interval` until the transfer is `DONE`.
///
/// `FAILED` and `INVALID` end the wait at once. Lookup errors are logged and
/// retried until `timeout` runs out.
pub(crate) async fn wait_for_transfer(
    source: &dyn TransferStatusSource,
    query: &StatusQuery,
    tx_hash: TxHash,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<(), BackendError> {
    let deadline = Instant::now() + timeout;

    loop {
        match source.transfer_status(query).await {
            Ok(status) => match status.status {
                TransferStatus::Done => {
                    info!(%tx_hash, tool = ?query.bridge, "transfer arrived on destination chain");
                    return Ok(());
                }
                TransferStatus::Failed | TransferStatus::Invalid => {
                    let message = status
                        .substatus_message
                        .or(status.substatus)
                        .unwrap_or_else(|| format!("{:?}", status.status));
                    return RelayFailedSnafu { tx_hash, message }.fail();
                }
                pending => debug!(%tx_hash, ?pending, substatus = ?status.substatus, "transfer pending"),
            },
            Err(e) => warn!(%tx_hash, "status lookup failed: {e}"),
        }

        ensure!(Instant::now() < deadline, RelayTimeoutSnafu { tx_hash, timeout });
        sleep(poll_interval).await;
    }
}

/// Swaps through the LI.FI aggregator, taking the best route it offers.
pub struct AggregatorBackend {
    client: LifiClient,
    options: RouteOptions,
    status_poll_interval: Duration,
    status_timeout: Duration,
}

impl AggregatorBackend {
    pub fn new(
        client: LifiClient,
        options: RouteOptions,
        status_poll_interval: Duration,
        status_timeout: Duration,
    ) -> Self {
        Self {
            client,
            options,
            status_poll_interval,
            status_timeout,
        }
    }

    async fn approve_step(&self, account: &dyn ChainAccount, step: &Step) -> Result<(), BackendError> {
        let token: Address = step.action.from_token.address.parse().map_err(|_| {
            BackendError::InvalidRoute {
                reason: format!("step token {} is not an EVM address", step.action.from_token.address),
            }
        })?;
        let Some(spender) = step.estimate.approval_address else {
            return Ok(());
        };
        ensure_allowance(account, token, spender, step.estimate.from_amount)
            .await
            .context(ChainSnafu)?;
        Ok(())
    }

    async fn wait_for_destination(&self, step: &Step, tx_hash: TxHash) -> Result<(), BackendError> {
        let query = StatusQuery {
            tx_hash: tx_hash.to_string(),
            bridge: Some(step.tool.clone()),
            from_chain: Some(step.action.from_chain_id),
            to_chain: Some(step.action.to_chain_id),
        };
        wait_for_transfer(
            &self.client,
            &query,
            tx_hash,
            self.status_poll_interval,
            self.status_timeout,
        )
        .await
    }
}

/// Picks the first route and works out who must be approved to spend.
fn plan_from_routes(routes: Vec<Route>, native_source: bool) -> Result<PlannedSwap<Route>, BackendError> {
    let route = routes.into_iter().next().context(NoRouteSnafu)?;
    let first = route.steps.first().context(InvalidRouteSnafu {
        reason: "route has no steps",
    })?;

    let spender = match first.estimate.approval_address {
        Some(spender) => spender,
        None if native_source => Address::ZERO,
        None => {
            return InvalidRouteSnafu {
                reason: "first step has no approval address",
            }
            .fail()
        }
    };
    let approval_amount = first.estimate.from_amount;

    Ok(PlannedSwap {
        spender,
        approval_amount,
        plan: route,
    })
}

fn to_transaction_request(tx: &StepTransaction) -> Result<TransactionRequest, BackendError> {
    let mut request = TransactionRequest::default()
        .with_to(tx.to)
        .with_input(tx.data.clone())
        .with_value(tx.value.unwrap_or_default());

    if let Some(gas_limit) = tx.gas_limit {
        let gas_limit = u64::try_from(gas_limit).map_err(|_| BackendError::InvalidRoute {
            reason: format!("gas limit {gas_limit} out of range"),
        })?;
        request = request.with_gas_limit(gas_limit);
    }
    if let Some(chain_id) = tx.chain_id {
        request = request.with_chain_id(chain_id);
    }
    Ok(request)
}

#[async_trait]
impl SwapBackend for AggregatorBackend {
    type Plan = Route;

    fn name(&self) -> &'static str {
        "lifi"
    }

    async fn plan(
        &self,
        account: &dyn ChainAccount,
        request: &SwapRequest<'_>,
    ) -> Result<PlannedSwap<Route>, BackendError> {
        let routes = self
            .client
            .get_routes(&RoutesRequest {
                from_chain_id: request.from_chain.chain_id,
                from_amount: request.amount,
                from_token_address: request.from_token.address,
                from_address: Some(account.address()),
                to_chain_id: request.to_chain_id,
                to_token_address: request.to_token,
                to_address: Some(request.recipient),
                options: Some(self.options.clone()),
            })
            .await
            .context(LifiSnafu)?;

        debug!(count = routes.len(), "routes received");
        plan_from_routes(routes, request.from_token.is_native())
    }

    async fn execute(
        &self,
        account: &dyn ChainAccount,
        request: &SwapRequest<'_>,
        route: Route,
    ) -> Result<SwapReceipt, BackendError> {
        let step_count = route.steps.len();
        let mut last_hash = None;

        for (index, step) in route.steps.into_iter().enumerate() {
            ensure!(
                step.action.from_chain_id == request.from_chain.chain_id,
                InvalidRouteSnafu {
                    reason: format!(
                        "step {} starts on chain {}, only source-chain steps can be signed",
                        index + 1,
                        step.action.from_chain_id
                    ),
                }
            );
            if index > 0 {
                self.approve_step(account, &step).await?;
            }

            let populated = self
                .client
                .get_step_transaction(&step)
                .await
                .context(LifiSnafu)?;
            let tx = populated
                .transaction_request
                .as_ref()
                .context(InvalidRouteSnafu {
                    reason: format!("step {} has no transaction data", index + 1),
                })?;

            let tx_hash = account
                .send_transaction(to_transaction_request(tx)?)
                .await
                .context(ChainSnafu)?;
            info!(step = index + 1, of = step_count, tool = %populated.tool, %tx_hash, "route step mined");

            if populated.is_cross_chain() {
                self.wait_for_destination(&populated, tx_hash).await?;
            }
            last_hash = Some(tx_hash);
        }

        Ok(SwapReceipt { tx_hash: last_hash })
    }
}
