use alloy::primitives::TxHash;
use snafu::{prelude::*, Location};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("EVMRPCError at {loc}: {source}"))]
    EVMRpcError {
        source: alloy::transports::RpcError<alloy::transports::TransportErrorKind>,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("Contract call failed at {loc}: {source}"))]
    ContractCall {
        source: alloy::contract::Error,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("Waiting for transaction failed at {loc}: {source}"))]
    PendingTransaction {
        source: alloy::providers::PendingTransactionError,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("Transaction {tx_hash} reverted"))]
    TransactionReverted { tx_hash: TxHash },

    #[snafu(display("Cannot connect to {chain}: {source}"))]
    Provider {
        chain: String,
        source: blockchain_utils::ProviderError,
    },

    #[snafu(display("Account key unusable: {source}"))]
    Signer { source: swap_models::AccountError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
