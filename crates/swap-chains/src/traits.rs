use std::sync::Arc;

use alloy::{
    primitives::{Address, Bytes, TxHash, U256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use swap_models::{AccountSecret, ChainDescriptor};

use crate::Result;

/// One account's signing view of one chain.
#[async_trait]
pub trait ChainAccount: Send + Sync {
    fn address(&self) -> Address;

    /// Balance in base units. `NATIVE_TOKEN_SENTINEL` reads the native coin.
    async fn balance(&self, token: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256>;

    /// Sends `approve(spender, amount)` and waits for it to be mined.
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash>;

    /// Read-only `eth_call` from this account.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes>;

    /// Signs and sends `tx`, then waits for a successful receipt.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;
}

#[async_trait]
pub trait AccountConnector: Send + Sync {
    async fn connect(
        &self,
        secret: &AccountSecret,
        chain: &ChainDescriptor,
    ) -> Result<Arc<dyn ChainAccount>>;
}
