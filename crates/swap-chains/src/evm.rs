use std::{sync::Arc, time::Duration};

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider},
    rpc::types::TransactionRequest,
    sol,
};
use async_trait::async_trait;
use blockchain_utils::create_http_wallet_provider;
use snafu::{ensure, ResultExt};
use swap_models::{AccountSecret, ChainDescriptor, NATIVE_TOKEN_SENTINEL};
use tracing::{debug, info};

use crate::{
    error::{
        ContractCallSnafu, EVMRpcSnafu, PendingTransactionSnafu, ProviderSnafu, SignerSnafu,
        TransactionRevertedSnafu,
    },
    AccountConnector, ChainAccount, Result,
};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
}

/// An account on an EVM chain reached over HTTP JSON-RPC.
pub struct EvmAccount {
    provider: DynProvider,
    address: Address,
    chain_name: String,
    confirmations: u64,
    receipt_timeout: Option<Duration>,
}

impl EvmAccount {
    pub fn connect(
        secret: &AccountSecret,
        chain: &ChainDescriptor,
        confirmations: u64,
        receipt_timeout: Option<Duration>,
    ) -> Result<Self> {
        let signer = secret.signer().context(SignerSnafu)?;
        let address = signer.address();
        let provider =
            create_http_wallet_provider(&chain.rpc_url, signer).context(ProviderSnafu {
                chain: chain.name.clone(),
            })?;

        Ok(Self {
            provider,
            address,
            chain_name: chain.name.clone(),
            confirmations: confirmations.max(1),
            receipt_timeout,
        })
    }

    async fn confirm(&self, pending: PendingTransactionBuilder<Ethereum>) -> Result<TxHash> {
        let tx_hash = *pending.tx_hash();
        debug!(chain = %self.chain_name, %tx_hash, "waiting for receipt");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(self.receipt_timeout)
            .get_receipt()
            .await
            .context(PendingTransactionSnafu)?;

        ensure!(receipt.status(), TransactionRevertedSnafu { tx_hash });
        Ok(tx_hash)
    }
}

#[async_trait]
impl ChainAccount for EvmAccount {
    fn address(&self) -> Address {
        self.address
    }

    async fn balance(&self, token: Address) -> Result<U256> {
        if token == NATIVE_TOKEN_SENTINEL {
            return self
                .provider
                .get_balance(self.address)
                .await
                .context(EVMRpcSnafu);
        }

        IERC20::new(token, self.provider.clone())
            .balanceOf(self.address)
            .call()
            .await
            .context(ContractCallSnafu)
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256> {
        IERC20::new(token, self.provider.clone())
            .allowance(self.address, spender)
            .call()
            .await
            .context(ContractCallSnafu)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let pending = IERC20::new(token, self.provider.clone())
            .approve(spender, amount)
            .send()
            .await
            .context(ContractCallSnafu)?;

        let tx_hash = self.confirm(pending).await?;
        info!(chain = %self.chain_name, %token, %spender, %tx_hash, "approval mined");
        Ok(tx_hash)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        self.provider
            .call(tx.with_from(self.address))
            .await
            .context(EVMRpcSnafu)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let pending = self
            .provider
            .send_transaction(tx.with_from(self.address))
            .await
            .context(EVMRpcSnafu)?;

        self.confirm(pending).await
    }
}

/// Opens [`EvmAccount`]s against each chain's configured RPC endpoint.
#[derive(Debug, Clone)]
pub struct EvmConnector {
    confirmations: u64,
    receipt_timeout: Option<Duration>,
}

impl EvmConnector {
    pub fn new(confirmations: u64, receipt_timeout: Option<Duration>) -> Self {
        Self {
            confirmations,
            receipt_timeout,
        }
    }
}

impl Default for EvmConnector {
    fn default() -> Self {
        Self::new(1, Some(Duration::from_secs(300)))
    }
}

#[async_trait]
impl AccountConnector for EvmConnector {
    async fn connect(
        &self,
        secret: &AccountSecret,
        chain: &ChainDescriptor,
    ) -> Result<Arc<dyn ChainAccount>> {
        let account = EvmAccount::connect(secret, chain, self.confirmations, self.receipt_timeout)?;
        Ok(Arc::new(account))
    }
}
