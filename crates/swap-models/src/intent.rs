use std::time::Duration;

use alloy::primitives::Address;
use rust_decimal::Decimal;

/// How much of the source token each account sends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountMode {
    /// The same amount, in whole tokens, for every account.
    Fixed(Decimal),
    /// A random share of each account's balance, in `(0, range]` percent.
    RandomPercent(f64),
}

/// What the user asked for. Validated by the orchestrator before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapIntent {
    pub from_chain: u64,
    pub to_chain: u64,
    pub from_token: Address,
    pub to_token: Address,
    /// `None` when no amount was entered.
    pub amount_mode: Option<AmountMode>,
    pub repeat_interval: Option<Duration>,
}

impl SwapIntent {
    pub fn is_same_token_same_chain(&self) -> bool {
        self.from_chain == self.to_chain && self.from_token == self.to_token
    }

    pub fn repeats(&self) -> bool {
        self.repeat_interval.is_some_and(|interval| !interval.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent() -> SwapIntent {
        SwapIntent {
            from_chain: 10121,
            to_chain: 10143,
            from_token: Address::ZERO,
            to_token: Address::ZERO,
            amount_mode: Some(AmountMode::Fixed(Decimal::new(1, 2))),
            repeat_interval: None,
        }
    }

    #[test]
    fn same_token_same_chain_needs_both_to_match() {
        let mut intent = intent();
        assert!(!intent.is_same_token_same_chain());
        intent.to_chain = intent.from_chain;
        assert!(intent.is_same_token_same_chain());
        intent.to_token = Address::repeat_byte(1);
        assert!(!intent.is_same_token_same_chain());
    }

    #[test]
    fn zero_interval_does_not_repeat() {
        let mut intent = intent();
        assert!(!intent.repeats());
        intent.repeat_interval = Some(Duration::ZERO);
        assert!(!intent.repeats());
        intent.repeat_interval = Some(Duration::from_secs(5));
        assert!(intent.repeats());
    }
}
