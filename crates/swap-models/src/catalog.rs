use std::collections::BTreeMap;

use alloy::primitives::Address;

use crate::{BridgeContracts, ChainDescriptor, TokenDescriptor, NATIVE_TOKEN_SENTINEL, STARGATE_TESTNET_CHAINS};

/// Chains a swap can start from, and the tokens known on each of them.
#[derive(Debug, Clone, Default)]
pub struct ChainCatalog {
    chains: Vec<ChainDescriptor>,
    tokens: BTreeMap<u64, Vec<TokenDescriptor>>,
}

impl ChainCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chain, replacing any earlier entry with the same id.
    pub fn insert_chain(&mut self, chain: ChainDescriptor) {
        self.chains.retain(|existing| existing.chain_id != chain.chain_id);
        self.chains.push(chain);
    }

    pub fn insert_tokens(&mut self, chain_id: u64, tokens: Vec<TokenDescriptor>) {
        self.tokens.entry(chain_id).or_default().extend(tokens);
    }

    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    pub fn chain(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|chain| chain.chain_id == chain_id)
    }

    pub fn tokens(&self, chain_id: u64) -> &[TokenDescriptor] {
        self.tokens.get(&chain_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn token(&self, chain_id: u64, address: Address) -> Option<&TokenDescriptor> {
        self.tokens(chain_id)
            .iter()
            .find(|token| token.address == address)
    }

    /// Points a chain at a different RPC endpoint. Returns false for an unknown chain.
    pub fn override_rpc_url(&mut self, chain_id: u64, rpc_url: impl Into<String>) -> bool {
        match self.chains.iter_mut().find(|chain| chain.chain_id == chain_id) {
            Some(chain) => {
                chain.rpc_url = rpc_url.into();
                true
            }
            None => false,
        }
    }

    /// The built-in Stargate testnet deployments, keyed by LayerZero chain id.
    pub fn stargate_testnet() -> Self {
        let mut catalog = Self::new();
        for entry in STARGATE_TESTNET_CHAINS {
            let chain_id = u64::from(entry.layer_zero_chain_id);
            catalog.insert_chain(ChainDescriptor {
                chain_id,
                name: entry.name.to_string(),
                logo_url: Some(entry.logo_url.to_string()),
                rpc_url: entry.rpc_url.to_string(),
                native_sentinel_address: NATIVE_TOKEN_SENTINEL,
                bridge_contracts: Some(BridgeContracts {
                    router: entry.router,
                    router_eth: entry.router_eth,
                    bridge: entry.bridge,
                }),
            });
            catalog.insert_tokens(
                chain_id,
                entry
                    .tokens
                    .iter()
                    .map(|token| TokenDescriptor {
                        chain_id,
                        address: token.address,
                        symbol: token.symbol.to_string(),
                        decimals: token.decimals,
                    })
                    .collect(),
            );
        }
        catalog
    }
}
