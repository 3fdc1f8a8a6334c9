//! Runs one swap intent across every selected account.
//!
//! A cycle validates the intent once, then walks the accounts in store order.
//! Accounts are handled one after another and a failing account never stops
//! the ones after it.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use key_store::KeyStore;
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use swap_chains::{ensure_allowance, AccountConnector};
use swap_models::{Account, AmountMode, ChainCatalog, ChainDescriptor, SwapIntent, TokenDescriptor};
use tracing::{debug, info, warn};

use crate::{
    amount::{AmountError, AmountResolver},
    backend::{BackendError, SwapBackend, SwapReceipt, SwapRequest},
    notify::NotificationSink,
};

/// Reasons a cycle is refused before any network call.
#[derive(Debug, Snafu)]
pub enum PreconditionFailure {
    #[snafu(display("No accounts available. Add one first"))]
    NoAccounts,

    #[snafu(display("No accounts selected"))]
    NoSelectedAccounts,

    #[snafu(display("Cannot swap a token for itself on the same chain"))]
    SameTokenSameChain,

    #[snafu(display("Random percentage range must be above zero"))]
    ZeroRandomRange,

    #[snafu(display("Enter an amount and pick a source token"))]
    MissingAmountOrToken,

    #[snafu(display("Could not read accounts: {source}"))]
    AccountStore { source: key_store::Error },
}

#[derive(Debug, Snafu)]
pub enum AccountFailure {
    #[snafu(display("Could not connect: {source}"))]
    Connect { source: swap_chains::Error },

    #[snafu(display("{source}"))]
    Amount { source: AmountError },

    #[snafu(display("Resolved amount of {symbol} is zero"))]
    ZeroAmount { symbol: String },

    #[snafu(display("{source}"))]
    Route { source: BackendError },

    #[snafu(display("Approval failed: {source}"))]
    Allowance { source: swap_chains::Error },

    #[snafu(display("Swap failed: {source}"))]
    Execute { source: BackendError },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CycleReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    Rejected(PreconditionFailure),
}

/// An intent that passed every precondition, resolved against the catalog.
struct ValidatedCycle<'a> {
    accounts: Vec<Account>,
    from_chain: &'a ChainDescriptor,
    from_token: &'a TokenDescriptor,
    to_token: Option<&'a TokenDescriptor>,
    amount_mode: AmountMode,
}

struct AccountSwap {
    amount: U256,
    receipt: SwapReceipt,
}

pub struct SwapOrchestrator<B> {
    store: Arc<dyn KeyStore>,
    catalog: Arc<ChainCatalog>,
    connector: Arc<dyn AccountConnector>,
    backend: B,
    notifier: Arc<dyn NotificationSink>,
    amounts: AmountResolver,
}

impl<B: SwapBackend> SwapOrchestrator<B> {
    pub fn new(
        store: Arc<dyn KeyStore>,
        catalog: Arc<ChainCatalog>,
        connector: Arc<dyn AccountConnector>,
        backend: B,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            catalog,
            connector,
            backend,
            notifier,
            amounts: AmountResolver::new(),
        }
    }

    pub fn with_amount_resolver(mut self, amounts: AmountResolver) -> Self {
        self.amounts = amounts;
        self
    }

    fn validate<'a>(&'a self, intent: &SwapIntent) -> Result<ValidatedCycle<'a>, PreconditionFailure> {
        let accounts = self.store.accounts().context(AccountStoreSnafu)?;
        ensure!(!accounts.is_empty(), NoAccountsSnafu);
        ensure!(
            accounts.iter().any(|account| account.selected),
            NoSelectedAccountsSnafu
        );
        ensure!(!intent.is_same_token_same_chain(), SameTokenSameChainSnafu);
        if let Some(AmountMode::RandomPercent(range)) = intent.amount_mode {
            ensure!(range > 0.0, ZeroRandomRangeSnafu);
        }

        let amount_mode = intent.amount_mode.context(MissingAmountOrTokenSnafu)?;
        let from_chain = self
            .catalog
            .chain(intent.from_chain)
            .context(MissingAmountOrTokenSnafu)?;
        let from_token = self
            .catalog
            .token(intent.from_chain, intent.from_token)
            .context(MissingAmountOrTokenSnafu)?;

        Ok(ValidatedCycle {
            accounts,
            from_chain,
            from_token,
            to_token: self.catalog.token(intent.to_chain, intent.to_token),
            amount_mode,
        })
    }

    /// Validates `intent` and swaps from every selected account.
    ///
    /// Emits one notification per attempted account, or a single error
    /// notification when the intent is rejected.
    pub async fn run_cycle(&self, intent: &SwapIntent) -> CycleOutcome {
        let cycle = match self.validate(intent) {
            Ok(cycle) => cycle,
            Err(failure) => {
                warn!("swap rejected: {failure}");
                self.notifier.error(None, failure.to_string());
                return CycleOutcome::Rejected(failure);
            }
        };

        info!(
            backend = self.backend.name(),
            from_chain = %cycle.from_chain.name,
            token = %cycle.from_token.symbol,
            to_chain = intent.to_chain,
            accounts = cycle.accounts.len(),
            "starting swap cycle"
        );

        let mut report = CycleReport::default();
        for (index, account) in cycle.accounts.iter().enumerate() {
            if !account.selected {
                report.skipped += 1;
                continue;
            }
            report.attempted += 1;
            let address = account.address().ok();

            match self.swap_account(&cycle, intent, account).await {
                Ok(swap) => {
                    report.succeeded += 1;
                    let amount = cycle.from_token.format_amount(swap.amount);
                    let message = match swap.receipt.tx_hash {
                        Some(tx_hash) => format!(
                            "Swapped {amount} {} via {}: {tx_hash}",
                            cycle.from_token.symbol,
                            self.backend.name()
                        ),
                        None => format!(
                            "Swapped {amount} {} via {}",
                            cycle.from_token.symbol,
                            self.backend.name()
                        ),
                    };
                    info!(index, account = ?address, "{message}");
                    self.notifier.success(address, message);
                }
                Err(failure) => {
                    report.failed += 1;
                    warn!(index, account = ?address, "swap failed: {failure}");
                    self.notifier.error(address, failure.to_string());
                }
            }
        }

        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "swap cycle finished"
        );
        CycleOutcome::Completed(report)
    }

    async fn swap_account(
        &self,
        cycle: &ValidatedCycle<'_>,
        intent: &SwapIntent,
        account: &Account,
    ) -> Result<AccountSwap, AccountFailure> {
        let chain_account = self
            .connector
            .connect(&account.secret, cycle.from_chain)
            .await
            .context(ConnectSnafu)?;
        let owner: Address = chain_account.address();

        let amount = self
            .amounts
            .resolve(cycle.amount_mode, cycle.from_token, chain_account.as_ref())
            .await
            .context(AmountSnafu)?;
        ensure!(
            !amount.is_zero(),
            ZeroAmountSnafu {
                symbol: cycle.from_token.symbol.clone()
            }
        );

        let request = SwapRequest {
            from_chain: cycle.from_chain,
            from_token: cycle.from_token,
            to_chain_id: intent.to_chain,
            to_token: intent.to_token,
            to_token_descriptor: cycle.to_token,
            amount,
            recipient: owner,
        };

        let planned = self
            .backend
            .plan(chain_account.as_ref(), &request)
            .await
            .context(RouteSnafu)?;

        let allowance = ensure_allowance(
            chain_account.as_ref(),
            cycle.from_token.address,
            planned.spender,
            planned.approval_amount,
        )
        .await
        .context(AllowanceSnafu)?;
        debug!(account = %owner, spender = %planned.spender, ?allowance, "allowance ready");

        let receipt = self
            .backend
            .execute(chain_account.as_ref(), &request, planned.plan)
            .await
            .context(ExecuteSnafu)?;

        Ok(AccountSwap { amount, receipt })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        str::FromStr,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use alloy::{
        primitives::{Bytes, TxHash},
        rpc::types::TransactionRequest,
    };
    use async_trait::async_trait;
    use key_store::InMemoryKeyStore;
    use rust_decimal::Decimal;
    use swap_chains::ChainAccount;
    use swap_models::AccountSecret;

    use super::*;
    use crate::{
        backend::PlannedSwap,
        notify::{NotificationKind, RecordingNotifier},
    };

    pub(crate) const KEYS: [&str; 3] = [
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
    ];

    pub(crate) struct FakeAccount {
        address: Address,
        balance: Option<U256>,
        approvals: Arc<AtomicUsize>,
    }

    impl FakeAccount {
        pub(crate) fn new(address: Address, balance: U256) -> Self {
            Self {
                address,
                balance: Some(balance),
                approvals: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl ChainAccount for FakeAccount {
        fn address(&self) -> Address {
            self.address
        }

        async fn balance(&self, _token: Address) -> swap_chains::Result<U256> {
            self.balance.ok_or(swap_chains::Error::TransactionReverted {
                tx_hash: TxHash::ZERO,
            })
        }

        async fn allowance(&self, _token: Address, _spender: Address) -> swap_chains::Result<U256> {
            Ok(U256::ZERO)
        }

        async fn approve(
            &self,
            _token: Address,
            _spender: Address,
            _amount: U256,
        ) -> swap_chains::Result<TxHash> {
            self.approvals.fetch_add(1, Ordering::SeqCst);
            Ok(TxHash::repeat_byte(0xaa))
        }

        async fn call(&self, _tx: TransactionRequest) -> swap_chains::Result<Bytes> {
            Ok(Bytes::new())
        }

        async fn send_transaction(&self, _tx: TransactionRequest) -> swap_chains::Result<TxHash> {
            Ok(TxHash::repeat_byte(0xbb))
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeConnector {
        pub(crate) connects: AtomicUsize,
        pub(crate) approvals: Arc<AtomicUsize>,
        pub(crate) balance: U256,
        /// Account whose balance lookups fail.
        pub(crate) balance_fails_for: Option<Address>,
    }

    #[async_trait]
    impl AccountConnector for FakeConnector {
        async fn connect(
            &self,
            secret: &AccountSecret,
            _chain: &ChainDescriptor,
        ) -> swap_chains::Result<Arc<dyn ChainAccount>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let address = secret
                .address()
                .map_err(|source| swap_chains::Error::Signer { source })?;
            let balance = (self.balance_fails_for != Some(address)).then_some(self.balance);
            Ok(Arc::new(FakeAccount {
                address,
                balance,
                approvals: self.approvals.clone(),
            }))
        }
    }

    /// Plans and executes instantly, failing route lookup for `fail_for`.
    #[derive(Default)]
    pub(crate) struct FakeBackend {
        pub(crate) fail_for: Option<Address>,
        pub(crate) planned: Mutex<Vec<(Address, U256)>>,
        pub(crate) executed: AtomicUsize,
    }

    impl FakeBackend {
        pub(crate) fn plan_count(&self) -> usize {
            self.planned.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SwapBackend for FakeBackend {
        type Plan = ();

        fn name(&self) -> &'static str {
            "fake"
        }

        async fn plan(
            &self,
            account: &dyn ChainAccount,
            request: &SwapRequest<'_>,
        ) -> Result<PlannedSwap<()>, BackendError> {
            self.planned
                .lock()
                .unwrap()
                .push((account.address(), request.amount));
            if self.fail_for == Some(account.address()) {
                return Err(BackendError::NoRoute);
            }
            Ok(PlannedSwap {
                spender: Address::repeat_byte(0x55),
                approval_amount: request.amount,
                plan: (),
            })
        }

        async fn execute(
            &self,
            _account: &dyn ChainAccount,
            _request: &SwapRequest<'_>,
            _plan: (),
        ) -> Result<SwapReceipt, BackendError> {
            self.executed.fetch_add(1, Ordering::SeqCst);
            Ok(SwapReceipt {
                tx_hash: Some(TxHash::repeat_byte(0xcc)),
            })
        }
    }

    impl<B> SwapOrchestrator<B> {
        pub(crate) fn backend(&self) -> &B {
            &self.backend
        }
    }

    pub(crate) fn usdc(catalog: &ChainCatalog, chain: u64) -> Address {
        catalog
            .tokens(chain)
            .iter()
            .find(|token| token.symbol == "USDC")
            .unwrap()
            .address
    }

    pub(crate) fn intent(catalog: &ChainCatalog) -> SwapIntent {
        SwapIntent {
            from_chain: 10121,
            to_chain: 10143,
            from_token: usdc(catalog, 10121),
            to_token: usdc(catalog, 10143),
            amount_mode: Some(AmountMode::Fixed(Decimal::from_str("1.5").unwrap())),
            repeat_interval: None,
        }
    }

    pub(crate) fn accounts(selected: &[bool]) -> Vec<Account> {
        selected
            .iter()
            .zip(KEYS)
            .map(|(&selected, key)| Account {
                secret: AccountSecret::parse(key).unwrap(),
                selected,
            })
            .collect()
    }

    pub(crate) struct Harness<B = FakeBackend> {
        pub(crate) orchestrator: SwapOrchestrator<B>,
        pub(crate) connector: Arc<FakeConnector>,
        pub(crate) notifier: Arc<RecordingNotifier>,
    }

    pub(crate) fn harness(accounts: Vec<Account>, backend: FakeBackend) -> Harness {
        harness_with(
            accounts,
            backend,
            FakeConnector {
                balance: U256::from(1_000_000u64),
                ..FakeConnector::default()
            },
        )
    }

    pub(crate) fn harness_with<B: SwapBackend>(
        accounts: Vec<Account>,
        backend: B,
        connector: FakeConnector,
    ) -> Harness<B> {
        let connector = Arc::new(connector);
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SwapOrchestrator::new(
            Arc::new(InMemoryKeyStore::with_accounts(accounts)),
            Arc::new(ChainCatalog::stargate_testnet()),
            connector.clone(),
            backend,
            notifier.clone(),
        )
        .with_amount_resolver(AmountResolver::with_seed(1));
        Harness {
            orchestrator,
            connector,
            notifier,
        }
    }

    async fn assert_rejected(accounts: Vec<Account>, intent: SwapIntent) -> PreconditionFailure {
        let h = harness(accounts, FakeBackend::default());
        let outcome = h.orchestrator.run_cycle(&intent).await;

        assert_eq!(h.connector.connects.load(Ordering::SeqCst), 0);
        assert_eq!(h.orchestrator.backend().plan_count(), 0);
        assert_eq!(h.notifier.notifications().len(), 1);
        assert_eq!(h.notifier.count(NotificationKind::Error), 1);
        assert!(h.notifier.notifications()[0].account.is_none());
        match outcome {
            CycleOutcome::Rejected(failure) => failure,
            CycleOutcome::Completed(report) => panic!("expected rejection, got {report:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_empty_store() {
        let catalog = ChainCatalog::stargate_testnet();
        let failure = assert_rejected(Vec::new(), intent(&catalog)).await;
        assert!(matches!(failure, PreconditionFailure::NoAccounts));
    }

    #[tokio::test]
    async fn rejects_when_nothing_selected() {
        let catalog = ChainCatalog::stargate_testnet();
        let failure = assert_rejected(accounts(&[false, false]), intent(&catalog)).await;
        assert!(matches!(failure, PreconditionFailure::NoSelectedAccounts));
    }

    #[tokio::test]
    async fn rejects_same_token_on_same_chain() {
        let catalog = ChainCatalog::stargate_testnet();
        let mut intent = intent(&catalog);
        intent.to_chain = intent.from_chain;
        intent.to_token = intent.from_token;
        let failure = assert_rejected(accounts(&[true]), intent).await;
        assert!(matches!(failure, PreconditionFailure::SameTokenSameChain));
    }

    #[tokio::test]
    async fn rejects_zero_random_range() {
        let catalog = ChainCatalog::stargate_testnet();
        let mut intent = intent(&catalog);
        intent.amount_mode = Some(AmountMode::RandomPercent(0.0));
        let failure = assert_rejected(accounts(&[true]), intent).await;
        assert!(matches!(failure, PreconditionFailure::ZeroRandomRange));
    }

    #[tokio::test]
    async fn rejects_missing_amount_or_unknown_token() {
        let catalog = ChainCatalog::stargate_testnet();

        let mut no_amount = intent(&catalog);
        no_amount.amount_mode = None;
        let failure = assert_rejected(accounts(&[true]), no_amount).await;
        assert!(matches!(failure, PreconditionFailure::MissingAmountOrToken));

        let mut unknown_token = intent(&catalog);
        unknown_token.from_token = Address::repeat_byte(0x77);
        let failure = assert_rejected(accounts(&[true]), unknown_token).await;
        assert!(matches!(failure, PreconditionFailure::MissingAmountOrToken));
    }

    #[tokio::test]
    async fn one_failing_account_does_not_stop_the_others() {
        let all = accounts(&[true, true, true]);
        let second = all[1].address().unwrap();
        let h = harness(
            all,
            FakeBackend {
                fail_for: Some(second),
                ..FakeBackend::default()
            },
        );
        let catalog = ChainCatalog::stargate_testnet();

        let outcome = h.orchestrator.run_cycle(&intent(&catalog)).await;

        let CycleOutcome::Completed(report) = outcome else {
            panic!("cycle was rejected");
        };
        assert_eq!(
            report,
            CycleReport {
                attempted: 3,
                succeeded: 2,
                failed: 1,
                skipped: 0
            }
        );
        assert_eq!(h.notifier.notifications().len(), 3);
        assert_eq!(h.notifier.count(NotificationKind::Success), 2);
        let errors: Vec<_> = h
            .notifier
            .notifications()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].account, Some(second));
        assert_eq!(errors[0].message, "No available routes for this pair");
        assert_eq!(h.orchestrator.backend().executed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unselected_accounts_are_skipped_without_calls() {
        let all = accounts(&[true, false, true]);
        let skipped = all[1].address().unwrap();
        let h = harness(all, FakeBackend::default());
        let catalog = ChainCatalog::stargate_testnet();

        let outcome = h.orchestrator.run_cycle(&intent(&catalog)).await;

        assert!(matches!(
            outcome,
            CycleOutcome::Completed(CycleReport {
                attempted: 2,
                succeeded: 2,
                failed: 0,
                skipped: 1
            })
        ));
        assert_eq!(h.connector.connects.load(Ordering::SeqCst), 2);
        let planned = h.orchestrator.backend().planned.lock().unwrap().clone();
        assert!(planned.iter().all(|(address, _)| *address != skipped));
    }

    #[tokio::test]
    async fn fixed_amount_is_sent_in_base_units_and_approved() {
        let h = harness(accounts(&[true]), FakeBackend::default());
        let catalog = ChainCatalog::stargate_testnet();

        h.orchestrator.run_cycle(&intent(&catalog)).await;

        let planned = h.orchestrator.backend().planned.lock().unwrap().clone();
        // USDC on the Goerli testnet has 6 decimals
        assert_eq!(planned[0].1, U256::from(1_500_000u64));
        assert_eq!(h.connector.approvals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_amount_fails_the_account_before_routing() {
        let h = harness(accounts(&[true]), FakeBackend::default());
        let catalog = ChainCatalog::stargate_testnet();
        let mut intent = intent(&catalog);
        intent.amount_mode = Some(AmountMode::Fixed(Decimal::ZERO));

        let outcome = h.orchestrator.run_cycle(&intent).await;

        assert!(matches!(
            outcome,
            CycleOutcome::Completed(CycleReport { failed: 1, .. })
        ));
        assert_eq!(h.orchestrator.backend().plan_count(), 0);
        assert_eq!(h.notifier.count(NotificationKind::Error), 1);
    }

    #[tokio::test]
    async fn random_amount_uses_a_share_of_the_balance() {
        let h = harness(accounts(&[true]), FakeBackend::default());
        let catalog = ChainCatalog::stargate_testnet();
        let mut intent = intent(&catalog);
        intent.amount_mode = Some(AmountMode::RandomPercent(25.0));

        h.orchestrator.run_cycle(&intent).await;

        let planned = h.orchestrator.backend().planned.lock().unwrap().clone();
        let amount = planned[0].1;
        assert!(amount > U256::ZERO && amount <= U256::from(250_000u64));
    }

    #[tokio::test]
    async fn balance_failure_is_reported_for_that_account_only() {
        let all = accounts(&[true, true, true]);
        let second = all[1].address().unwrap();
        let h = harness_with(
            all,
            FakeBackend::default(),
            FakeConnector {
                balance: U256::from(1_000_000u64),
                balance_fails_for: Some(second),
                ..FakeConnector::default()
            },
        );
        let catalog = ChainCatalog::stargate_testnet();
        let mut intent = intent(&catalog);
        intent.amount_mode = Some(AmountMode::RandomPercent(50.0));

        let outcome = h.orchestrator.run_cycle(&intent).await;

        let CycleOutcome::Completed(report) = outcome else {
            panic!("cycle was rejected");
        };
        assert_eq!((report.succeeded, report.failed), (2, 1));
        let errors: Vec<_> = h
            .notifier
            .notifications()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].account, Some(second));
        assert!(errors[0].message.starts_with("Could not read USDC balance"));
        let planned = h.orchestrator.backend().planned.lock().unwrap().clone();
        assert_eq!(planned.len(), 2);
        assert!(planned.iter().all(|(address, _)| *address != second));
    }
}
