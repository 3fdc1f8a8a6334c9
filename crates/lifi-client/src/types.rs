use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serde_utils::{option_u256_decimal, u256_decimal};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub id: u64,
    pub key: String,
    pub name: String,
    #[serde(rename = "logoURI", default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_token: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metamask: Option<MetamaskChain>,
}

impl Chain {
    /// First public RPC endpoint LI.FI advertises for the chain.
    pub fn rpc_url(&self) -> Option<&str> {
        self.metamask
            .as_ref()
            .and_then(|metamask| metamask.rpc_urls.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetamaskChain {
    #[serde(default)]
    pub rpc_urls: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainsResponse {
    pub chains: Vec<Chain>,
}

/// Token as LI.FI reports it. The address is kept verbatim since non-EVM
/// chains use other encodings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub chain_id: u64,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "logoURI", default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(rename = "priceUSD", default, skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokensResponse {
    pub tokens: std::collections::HashMap<u64, Vec<Token>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteOrder {
    Recommended,
    Fastest,
    Cheapest,
    Safest,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptions {
    /// Fraction, `0.05` is 5%.
    pub slippage: f64,
    pub order: RouteOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrator: Option<String>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            slippage: 0.05,
            order: RouteOrder::Recommended,
            integrator: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesRequest {
    pub from_chain_id: u64,
    #[serde(with = "u256_decimal")]
    pub from_amount: U256,
    pub from_token_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<Address>,
    pub to_chain_id: u64,
    pub to_token_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RouteOptions>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoutesResponse {
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub from_chain_id: u64,
    #[serde(with = "u256_decimal")]
    pub from_amount: U256,
    pub to_chain_id: u64,
    #[serde(with = "u256_decimal")]
    pub to_amount: U256,
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One step of a route. Unknown fields are carried through untouched so the
/// step can be posted back for its transaction data.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tool: String,
    pub action: Action,
    pub estimate: Estimate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_request: Option<StepTransaction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn is_cross_chain(&self) -> bool {
        self.action.from_chain_id != self.action.to_chain_id
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub from_chain_id: u64,
    pub to_chain_id: u64,
    pub from_token: Token,
    pub to_token: Token,
    #[serde(with = "u256_decimal")]
    pub from_amount: U256,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_address: Option<Address>,
    #[serde(with = "u256_decimal")]
    pub from_amount: U256,
    #[serde(with = "u256_decimal")]
    pub to_amount: U256,
    #[serde(
        default,
        with = "option_u256_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub to_amount_min: Option<U256>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ready-to-sign transaction returned by `advanced/stepTransaction`.
/// Numeric fields arrive as hex quantities.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTransaction {
    pub to: Address,
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    NotFound,
    Invalid,
    Pending,
    Done,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TransferStatus {
    pub fn is_final(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Invalid)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusQuery {
    pub tx_hash: String,
    pub bridge: Option<String>,
    pub from_chain: Option<u64>,
    pub to_chain: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: TransferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substatus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substatus_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sending: Option<TransactionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiving: Option<TransactionInfo>,
}
