use alloy::primitives::{Address, TxHash, U256};
use swap_models::NATIVE_TOKEN_SENTINEL;
use tracing::{debug, info};

use crate::{ChainAccount, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceOutcome {
    /// Native coin, nothing to approve.
    NativeToken,
    Sufficient { current: U256 },
    Approved { tx_hash: TxHash },
}

/// Makes sure `spender` may pull at least `required` of `token` from `account`.
///
/// When the current allowance falls short an unlimited approval is sent and
/// awaited, so later cycles against the same spender skip this step.
pub async fn ensure_allowance(
    account: &dyn ChainAccount,
    token: Address,
    spender: Address,
    required: U256,
) -> Result<AllowanceOutcome> {
    if token == NATIVE_TOKEN_SENTINEL {
        return Ok(AllowanceOutcome::NativeToken);
    }

    let current = account.allowance(token, spender).await?;
    if current >= required {
        debug!(owner = %account.address(), %token, %spender, %current, "allowance sufficient");
        return Ok(AllowanceOutcome::Sufficient { current });
    }

    info!(owner = %account.address(), %token, %spender, %current, %required, "approving spender");
    let tx_hash = account.approve(token, spender, U256::MAX).await?;
    Ok(AllowanceOutcome::Approved { tx_hash })
}
