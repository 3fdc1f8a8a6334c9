use alloy::primitives::{utils::format_units, Address, U256};
use serde::{Deserialize, Serialize};

/// Address used in place of a contract address for a chain's native coin.
pub const NATIVE_TOKEN_SENTINEL: Address = Address::ZERO;

/// Stargate contracts deployed on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeContracts {
    pub router: Address,
    /// Only chains with a bridgeable native coin have one.
    pub router_eth: Option<Address>,
    pub bridge: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    /// EVM chain id for the aggregator catalog, LayerZero chain id for the bridge catalog.
    pub chain_id: u64,
    pub name: String,
    pub logo_url: Option<String>,
    pub rpc_url: String,
    pub native_sentinel_address: Address,
    pub bridge_contracts: Option<BridgeContracts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub chain_id: u64,
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn is_native(&self) -> bool {
        self.address == NATIVE_TOKEN_SENTINEL
    }

    /// Renders a base-unit amount in whole tokens, e.g. `1500000` USDC as `1.500000`.
    pub fn format_amount(&self, amount: U256) -> String {
        format_units(amount, self.decimals).unwrap_or_else(|_| amount.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> TokenDescriptor {
        TokenDescriptor {
            chain_id: 1,
            address: Address::repeat_byte(0x11),
            symbol: "USDC".to_string(),
            decimals: 6,
        }
    }

    #[test]
    fn native_is_detected_by_sentinel() {
        let mut token = usdc();
        assert!(!token.is_native());
        token.address = NATIVE_TOKEN_SENTINEL;
        assert!(token.is_native());
    }

    #[test]
    fn format_amount_uses_decimals() {
        assert_eq!(usdc().format_amount(U256::from(1_500_000u64)), "1.500000");
    }
}
