use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};

/// `functionType` for a plain remote swap in `quoteLayerZeroFee`.
pub const TYPE_SWAP_REMOTE: u8 = 1;

pub const BPS_DENOMINATOR: u64 = 10_000;

sol! {
    #[derive(Debug)]
    interface IStargateRouter {
        struct lzTxObj {
            uint256 dstGasForCall;
            uint256 dstNativeAmount;
            bytes dstNativeAddr;
        }

        function swap(
            uint16 dstChainId,
            uint256 srcPoolId,
            uint256 dstPoolId,
            address refundAddress,
            uint256 amountLD,
            uint256 minAmountLD,
            lzTxObj lzTxParams,
            bytes to,
            bytes payload
        ) external payable;

        function quoteLayerZeroFee(
            uint16 dstChainId,
            uint8 functionType,
            bytes toAddress,
            bytes transferAndCallPayload,
            lzTxObj lzTxParams
        ) external view returns (uint256 nativeFee, uint256 zroFee);
    }

    #[derive(Debug)]
    interface IStargateRouterETH {
        function swapETH(
            uint16 dstChainId,
            address refundAddress,
            bytes toAddress,
            uint256 amountLD,
            uint256 minAmountLD
        ) external payable;
    }
}

/// Stargate liquidity pool id for a token symbol.
pub fn pool_id(symbol: &str) -> Option<u64> {
    let id = match symbol.to_ascii_uppercase().as_str() {
        "USDC" => 1,
        "USDT" => 2,
        "DAI" => 3,
        "BUSD" => 5,
        "FRAX" => 7,
        "USDD" => 11,
        "SGETH" | "ETH" => 13,
        "SUSD" => 14,
        "LUSD" => 15,
        "MAI" => 16,
        "METIS" => 17,
        _ => return None,
    };
    Some(id)
}

/// `amount` less `slippage_bps` basis points, rounded down.
pub fn min_amount(amount: U256, slippage_bps: u16) -> U256 {
    let keep = BPS_DENOMINATOR.saturating_sub(u64::from(slippage_bps));
    amount / U256::from(BPS_DENOMINATOR) * U256::from(keep)
        + amount % U256::from(BPS_DENOMINATOR) * U256::from(keep) / U256::from(BPS_DENOMINATOR)
}

/// Recipient encoded the way the router expects, `abi.encodePacked(address)`.
pub fn encode_recipient(recipient: Address) -> Bytes {
    Bytes::copy_from_slice(recipient.as_slice())
}

fn no_airdrop() -> IStargateRouter::lzTxObj {
    IStargateRouter::lzTxObj {
        dstGasForCall: U256::ZERO,
        dstNativeAmount: U256::ZERO,
        dstNativeAddr: Bytes::new(),
    }
}

pub fn quote_fee_calldata(dst_chain_id: u16, recipient: Address) -> Bytes {
    IStargateRouter::quoteLayerZeroFeeCall {
        dstChainId: dst_chain_id,
        functionType: TYPE_SWAP_REMOTE,
        toAddress: encode_recipient(recipient),
        transferAndCallPayload: Bytes::new(),
        lzTxParams: no_airdrop(),
    }
    .abi_encode()
    .into()
}

/// Native fee out of `quoteLayerZeroFee` return data.
pub fn decode_native_fee(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    Ok(IStargateRouter::quoteLayerZeroFeeCall::abi_decode_returns(data)?.nativeFee)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSwap {
    pub dst_chain_id: u16,
    pub src_pool_id: u64,
    pub dst_pool_id: u64,
    pub refund: Address,
    pub recipient: Address,
    pub amount: U256,
    pub min_amount: U256,
}

pub fn swap_calldata(swap: &PoolSwap) -> Bytes {
    IStargateRouter::swapCall {
        dstChainId: swap.dst_chain_id,
        srcPoolId: U256::from(swap.src_pool_id),
        dstPoolId: U256::from(swap.dst_pool_id),
        refundAddress: swap.refund,
        amountLD: swap.amount,
        minAmountLD: swap.min_amount,
        lzTxParams: no_airdrop(),
        to: encode_recipient(swap.recipient),
        payload: Bytes::new(),
    }
    .abi_encode()
    .into()
}

pub fn swap_eth_calldata(
    dst_chain_id: u16,
    refund: Address,
    recipient: Address,
    amount: U256,
    min_amount: U256,
) -> Bytes {
    IStargateRouterETH::swapETHCall {
        dstChainId: dst_chain_id,
        refundAddress: refund,
        toAddress: encode_recipient(recipient),
        amountLD: amount,
        minAmountLD: min_amount,
    }
    .abi_encode()
    .into()
}
