use alloy::primitives::Address;
use lifi_client::LifiClient;
use swap_models::{ChainCatalog, ChainDescriptor, TokenDescriptor, NATIVE_TOKEN_SENTINEL};
use tracing::{debug, info};

/// Chains and tokens LI.FI reports, restricted to EVM chains with a public RPC.
pub async fn lifi_catalog(client: &LifiClient) -> lifi_client::Result<ChainCatalog> {
    let chains = client.get_chains().await?;
    let ids: Vec<u64> = chains.iter().map(|chain| chain.id).collect();
    let mut tokens = client.get_tokens(&ids).await?;

    let mut catalog = ChainCatalog::new();
    for chain in &chains {
        let Some(descriptor) = chain_descriptor(chain) else {
            debug!(chain = %chain.name, "skipping chain without RPC endpoint");
            continue;
        };
        let chain_tokens = tokens
            .remove(&chain.id)
            .unwrap_or_default()
            .iter()
            .filter_map(|token| token_descriptor(chain.id, token))
            .collect();
        catalog.insert_chain(descriptor);
        catalog.insert_tokens(chain.id, chain_tokens);
    }

    info!(chains = catalog.chains().len(), "loaded LI.FI catalog");
    Ok(catalog)
}

pub(crate) fn chain_descriptor(chain: &lifi_client::Chain) -> Option<ChainDescriptor> {
    Some(ChainDescriptor {
        chain_id: chain.id,
        name: chain.name.clone(),
        logo_url: chain.logo_uri.clone(),
        rpc_url: chain.rpc_url()?.to_string(),
        native_sentinel_address: NATIVE_TOKEN_SENTINEL,
        bridge_contracts: None,
    })
}

pub(crate) fn token_descriptor(chain_id: u64, token: &lifi_client::Token) -> Option<TokenDescriptor> {
    let address: Address = token.address.parse().ok()?;
    Some(TokenDescriptor {
        chain_id,
        address,
        symbol: token.symbol.clone(),
        decimals: token.decimals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_needs_an_rpc_url() {
        let with_rpc: lifi_client::Chain = serde_json::from_str(
            r#"{"id": 137, "key": "pol", "name": "Polygon",
                "logoURI": "https://example.org/polygon.svg",
                "metamask": {"rpcUrls": ["https://polygon-rpc.com/"], "chainName": "Matic"}}"#,
        )
        .unwrap();
        let descriptor = chain_descriptor(&with_rpc).unwrap();
        assert_eq!(descriptor.chain_id, 137);
        assert_eq!(descriptor.rpc_url, "https://polygon-rpc.com/");
        assert_eq!(descriptor.native_sentinel_address, Address::ZERO);
        assert!(descriptor.bridge_contracts.is_none());

        let without_rpc: lifi_client::Chain =
            serde_json::from_str(r#"{"id": 1, "key": "eth", "name": "Ethereum"}"#).unwrap();
        assert!(chain_descriptor(&without_rpc).is_none());
    }

    #[test]
    fn non_evm_token_addresses_are_dropped() {
        let evm: lifi_client::Token = serde_json::from_str(
            r#"{"address": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "chainId": 137,
                "symbol": "USDC", "decimals": 6, "name": "USD Coin"}"#,
        )
        .unwrap();
        let token = token_descriptor(137, &evm).unwrap();
        assert_eq!(token.symbol, "USDC");
        assert_eq!(token.decimals, 6);

        let solana: lifi_client::Token = serde_json::from_str(
            r#"{"address": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "chainId": 1151111081099710,
                "symbol": "USDC", "decimals": 6}"#,
        )
        .unwrap();
        assert!(token_descriptor(1151111081099710, &solana).is_none());
    }
}
