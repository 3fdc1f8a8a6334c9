use alloy::primitives::{address, Address};

use crate::NATIVE_TOKEN_SENTINEL;

pub struct StargateToken {
    pub address: Address,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// A Stargate deployment on one chain.
pub struct StargateChain {
    pub name: &'static str,
    pub logo_url: &'static str,
    pub rpc_url: &'static str,
    pub router: Address,
    pub router_eth: Option<Address>,
    pub bridge: Address,
    pub layer_zero_chain_id: u16,
    pub tokens: &'static [StargateToken],
}

const fn token(address: Address, symbol: &'static str, decimals: u8) -> StargateToken {
    StargateToken {
        address,
        symbol,
        decimals,
    }
}

macro_rules! logo {
    ($file:literal) => {
        concat!(
            "https://raw.githubusercontent.com/lifinance/types/main/src/assets/icons/chains/",
            $file
        )
    };
}

pub static STARGATE_TESTNET_CHAINS: &[StargateChain] = &[
    StargateChain {
        name: "Goerli",
        logo_url: logo!("ethereum_goerli.png"),
        rpc_url: "https://rpc.ankr.com/eth_goerli",
        router: address!("0x7612aE2a34E5A363E137De748801FB4c86499152"),
        router_eth: Some(address!("0xdb19Ad528F4649692B92586828346beF9e4a3532")),
        bridge: address!("0xE6612eB143e4B350d55aA2E229c80b15CA336413"),
        layer_zero_chain_id: 10121,
        tokens: &[
            token(NATIVE_TOKEN_SENTINEL, "gETH", 18),
            token(address!("0xDf0360Ad8C5ccf25095Aa97ee5F2785c8d848620"), "USDC", 6),
            token(address!("0x5bcc22abec37337630c0e0dd41d64fd86caee951"), "USDT", 6),
            token(address!("0xCf1F9cD3789Fc6296f4abB11dc460067Ae1a2673"), "SGETH", 18),
        ],
    },
    StargateChain {
        name: "Arbitrum-Goerli",
        logo_url: logo!("arbitrum_test.png"),
        rpc_url: "https://goerli-rollup.arbitrum.io/rpc",
        router: address!("0xb850873f4c993Ac2405A1AdD71F6ca5D4d4d6b4f"),
        router_eth: Some(address!("0x7612aE2a34E5A363E137De748801FB4c86499152")),
        bridge: address!("0xd43cbCC7642C1Df8e986255228174C2cca58d65b"),
        layer_zero_chain_id: 10143,
        tokens: &[
            token(NATIVE_TOKEN_SENTINEL, "agETH", 18),
            token(address!("0x6aAd876244E7A1Ad44Ec4824Ce813729E5B6C291"), "USDC", 6),
            token(address!("0x533046F316590C19d99c74eE661c6d541b64471C"), "USDT", 6),
            token(address!("0xb45186E02CC4AbC0e390EdFfdc2aBC8D523ea15e"), "SGETH", 18),
        ],
    },
    StargateChain {
        name: "Optimism-Goerli",
        logo_url: logo!("optimism_test.png"),
        rpc_url: "https://endpoints.omniatech.io/v1/op/goerli/public",
        router: address!("0x95461eF0e0ecabC049a5c4a6B98Ca7B335FAF068"),
        router_eth: Some(address!("0xc744E5c3E5A4F6d70Df217a0837D32B05a951d08")),
        bridge: address!("0x5A7465e1a68F430E7A696aDBC5C107528C1cC9d0"),
        layer_zero_chain_id: 10132,
        tokens: &[
            token(NATIVE_TOKEN_SENTINEL, "ogETH", 18),
            token(address!("0x0CEDBAF2D0bFF895C861c5422544090EEdC653Bf"), "USDC", 6),
            token(address!("0xf70E5b860e24cc18436b1A6AA512a1599EE90731"), "SGETH", 18),
        ],
    },
    StargateChain {
        name: "BNB Chain",
        logo_url: logo!("bsc_test.png"),
        rpc_url: "https://bsc-testnet.publicnode.com",
        router: address!("0xbB0f1be1E9CE9cB27EA5b0c3a85B7cc3381d8176"),
        router_eth: None,
        bridge: address!("0xa1E105511416aEc3200CcE7069548cF332c6DCA2"),
        layer_zero_chain_id: 10102,
        tokens: &[
            token(address!("0x1010Bb1b9Dff29e6233E7947e045e0ba58f6E92e"), "BUSD", 6),
            token(address!("0xF49E250aEB5abDf660d643583AdFd0be41464EfD"), "USDT", 6),
        ],
    },
    StargateChain {
        name: "Fuji",
        logo_url: logo!("avalanche_test.png"),
        rpc_url: "https://avalanche-fuji-c-chain.publicnode.com",
        router: address!("0x13093E05Eb890dfA6DacecBdE51d24DabAb2Faa1"),
        router_eth: None,
        bridge: address!("0x29fBC4E4092Db862218c62a888a00F9521619230"),
        layer_zero_chain_id: 10106,
        tokens: &[
            token(address!("0x4A0D1092E9df255cf95D72834Ea9255132782318"), "USDC", 6),
            token(address!("0x134Dc38AE8C853D1aa2103d5047591acDAA16682"), "USDT", 6),
        ],
    },
    StargateChain {
        name: "Mumbai",
        logo_url: logo!("polygon_test.png"),
        rpc_url: "https://polygon-mumbai-bor.publicnode.com",
        router: address!("0x817436a076060D158204d955E5403b6Ed0A5fac0"),
        router_eth: None,
        bridge: address!("0x629B57D89b1739eE1C0c0fD9eab426306e11cF42"),
        layer_zero_chain_id: 10109,
        tokens: &[
            token(address!("0x742DfA5Aa70a8212857966D491D67B09Ce7D6ec7"), "USDC", 6),
            token(address!("0x6Fc340be8e378c2fF56476409eF48dA9a3B781a0"), "USDT", 6),
        ],
    },
    StargateChain {
        name: "Fantom",
        logo_url: logo!("fantom.svg"),
        rpc_url: "https://endpoints.omniatech.io/v1/fantom/testnet/public",
        router: address!("0xa73b0a56B29aD790595763e71505FCa2c1abb77f"),
        router_eth: None,
        bridge: address!("0xb97948ad8805174e0CB27cAf0115e5eA5e02F3A7"),
        layer_zero_chain_id: 10112,
        tokens: &[
            token(address!("0x076488D244A73DA4Fa843f5A8Cd91F655CA81a1e"), "USDC", 6),
        ],
    },
];
