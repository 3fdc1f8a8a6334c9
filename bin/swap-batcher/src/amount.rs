use std::sync::{Mutex, PoisonError};

use alloy::primitives::U256;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;
use snafu::{OptionExt, ResultExt, Snafu};
use swap_chains::ChainAccount;
use swap_models::{AmountMode, TokenDescriptor};
use tracing::debug;

/// Smallest random percentage drawn, so a draw of exactly zero still moves funds.
pub const RANDOM_PERCENT_EPSILON: f64 = 1e-6;

/// Fixed-point scale for percentages: parts per billion of one percent.
const PERCENT_SCALE: u64 = 1_000_000_000;

#[derive(Debug, Snafu)]
pub enum AmountError {
    #[snafu(display("Could not read {symbol} balance: {source}"))]
    Balance {
        symbol: String,
        source: swap_chains::Error,
    },

    #[snafu(display("Amount {value} does not fit {decimals}-decimal base units"))]
    Unrepresentable { value: Decimal, decimals: u8 },
}

/// Whole-token decimal amount to base units, rounding down.
pub fn fixed_base_units(value: Decimal, decimals: u8) -> Option<U256> {
    if value.is_sign_negative() {
        return None;
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let unit = U256::from(10u64).checked_pow(U256::from(decimals))?;
    let divisor = U256::from(10u64).checked_pow(U256::from(value.scale()))?;
    Some(mantissa.checked_mul(unit)? / divisor)
}

/// Percentage in `(0, range]`.
pub fn draw_percent<R: Rng + ?Sized>(rng: &mut R, range: f64) -> f64 {
    (rng.gen::<f64>() * range + RANDOM_PERCENT_EPSILON).min(range)
}

/// `floor(balance * percent / 100)`, computed in fixed point.
pub fn percent_of(balance: U256, percent: f64) -> U256 {
    if percent.is_nan() || percent <= 0.0 {
        return U256::ZERO;
    }
    let scaled = U256::from((percent * PERCENT_SCALE as f64).floor() as u128);
    let denominator = U256::from(100u64) * U256::from(PERCENT_SCALE);
    match balance.checked_mul(scaled) {
        Some(product) => product / denominator,
        None => balance / denominator * scaled,
    }
}

/// Turns an [`AmountMode`] into a per-account base-unit amount.
pub struct AmountResolver {
    rng: Mutex<StdRng>,
}

impl AmountResolver {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub async fn resolve(
        &self,
        mode: AmountMode,
        token: &TokenDescriptor,
        account: &dyn ChainAccount,
    ) -> Result<U256, AmountError> {
        match mode {
            AmountMode::Fixed(value) => {
                fixed_base_units(value, token.decimals).context(UnrepresentableSnafu {
                    value,
                    decimals: token.decimals,
                })
            }
            AmountMode::RandomPercent(range) => {
                let percent = {
                    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                    draw_percent(&mut *rng, range)
                };
                let balance = account.balance(token.address).await.context(BalanceSnafu {
                    symbol: token.symbol.clone(),
                })?;
                let amount = percent_of(balance, percent);
                debug!(
                    account = %account.address(),
                    %balance,
                    percent,
                    %amount,
                    "resolved random amount"
                );
                Ok(amount)
            }
        }
    }
}

impl Default for AmountResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::{
        primitives::{Address, Bytes, TxHash},
        rpc::types::TransactionRequest,
    };
    use async_trait::async_trait;
    use swap_models::NATIVE_TOKEN_SENTINEL;

    use super::*;

    /// Only answers balance queries; `None` makes the lookup fail.
    struct BalanceOnly(Option<U256>);

    #[async_trait]
    impl ChainAccount for BalanceOnly {
        fn address(&self) -> Address {
            Address::repeat_byte(0x11)
        }

        async fn balance(&self, _token: Address) -> swap_chains::Result<U256> {
            self.0.ok_or(swap_chains::Error::TransactionReverted {
                tx_hash: TxHash::ZERO,
            })
        }

        async fn allowance(&self, _token: Address, _spender: Address) -> swap_chains::Result<U256> {
            unimplemented!()
        }

        async fn approve(
            &self,
            _token: Address,
            _spender: Address,
            _amount: U256,
        ) -> swap_chains::Result<TxHash> {
            unimplemented!()
        }

        async fn call(&self, _tx: TransactionRequest) -> swap_chains::Result<Bytes> {
            unimplemented!()
        }

        async fn send_transaction(&self, _tx: TransactionRequest) -> swap_chains::Result<TxHash> {
            unimplemented!()
        }
    }

    fn native() -> TokenDescriptor {
        TokenDescriptor {
            chain_id: 10121,
            address: NATIVE_TOKEN_SENTINEL,
            symbol: "gETH".to_string(),
            decimals: 18,
        }
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn fixed_amounts_round_down_to_base_units() {
        let cases = [
            ("0.01", 6, 10_000u128),
            ("0.01", 18, 10_000_000_000_000_000),
            ("1", 6, 1_000_000),
            ("1", 18, 1_000_000_000_000_000_000),
            ("123.456", 6, 123_456_000),
            ("123.456", 18, 123_456_000_000_000_000_000),
            ("0.0000001", 6, 0),
            ("1.9999999", 6, 1_999_999),
            ("0", 18, 0),
            ("42", 0, 42),
        ];
        for (value, decimals, expected) in cases {
            assert_eq!(
                fixed_base_units(dec(value), decimals),
                Some(U256::from(expected)),
                "{value} @ {decimals}"
            );
        }
    }

    #[test]
    fn negative_fixed_amount_is_rejected() {
        assert_eq!(fixed_base_units(dec("-1"), 6), None);
    }

    #[test]
    fn drawn_percent_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for range in [0.5, 1.0, 50.0, 100.0] {
            for _ in 0..1_000 {
                let percent = draw_percent(&mut rng, range);
                assert!(percent > 0.0 && percent <= range, "{percent} outside (0, {range}]");
            }
        }
    }

    #[test]
    fn percent_of_never_exceeds_the_range_share() {
        let balance = U256::from(1_000_000u64);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let amount = percent_of(balance, draw_percent(&mut rng, 50.0));
            assert!(amount <= U256::from(500_000u64));
        }
        assert_eq!(percent_of(balance, 50.0), U256::from(500_000u64));
        assert_eq!(percent_of(balance, 100.0), balance);
    }

    #[test]
    fn percent_of_empty_balance_is_zero() {
        assert_eq!(percent_of(U256::ZERO, 75.0), U256::ZERO);
        assert_eq!(percent_of(U256::from(10u64), 0.0), U256::ZERO);
    }

    #[test]
    fn percent_of_huge_balance_does_not_overflow() {
        let amount = percent_of(U256::MAX, 100.0);
        assert!(amount <= U256::MAX);
        assert!(amount > U256::MAX / U256::from(2u64));
    }

    #[tokio::test]
    async fn failed_balance_lookup_is_an_error_not_zero() {
        let resolver = AmountResolver::with_seed(3);
        let result = resolver
            .resolve(AmountMode::RandomPercent(50.0), &native(), &BalanceOnly(None))
            .await;
        assert!(matches!(result, Err(AmountError::Balance { ref symbol, .. }) if symbol == "gETH"));
    }

    #[tokio::test]
    async fn empty_balance_resolves_to_zero() {
        let resolver = AmountResolver::with_seed(3);
        let amount = resolver
            .resolve(
                AmountMode::RandomPercent(50.0),
                &native(),
                &BalanceOnly(Some(U256::ZERO)),
            )
            .await
            .unwrap();
        assert_eq!(amount, U256::ZERO);
    }

    #[tokio::test]
    async fn fixed_mode_never_reads_the_balance() {
        let resolver = AmountResolver::with_seed(3);
        let amount = resolver
            .resolve(AmountMode::Fixed(dec("0.5")), &native(), &BalanceOnly(None))
            .await
            .unwrap();
        assert_eq!(amount, U256::from(500_000_000_000_000_000u64));
    }
}
