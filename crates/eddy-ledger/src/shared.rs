//! Thread-safe ledger handle with post-commit event delivery.
//!
//! Each mutation runs under a single write guard, so readers never see a
//! half-applied operation. Observers are called only after the guard is
//! released; they may query or mutate the ledger from inside `on_event`.

use std::sync::Arc;

use eddy_core::error::LedgerError;
use eddy_core::event::LedgerEvent;
use eddy_core::traits::LedgerObserver;
use eddy_core::types::{AccountId, Amount};
use parking_lot::RwLock;
use tracing::trace;

use crate::ledger::Ledger;
use crate::receipt::{ApprovalReceipt, ClaimReceipt, Receipt, StakeReceipt, TransferReceipt};
use crate::snapshot::LedgerSnapshot;

/// Cloneable handle to a ledger shared between threads.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
    observers: Arc<RwLock<Vec<Arc<dyn LedgerObserver>>>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register an observer for events of subsequent operations.
    pub fn subscribe(&self, observer: Arc<dyn LedgerObserver>) {
        self.observers.write().push(observer);
    }

    /// Run `f` against a consistent view of the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.inner.read().balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.inner.read().total_supply()
    }

    pub fn stake_total_share(&self) -> Amount {
        self.inner.read().stake_total_share()
    }

    pub fn stake_total_reward(&self) -> Amount {
        self.inner.read().stake_total_reward()
    }

    pub fn account_stake_reward(&self, account: &AccountId) -> Amount {
        self.inner.read().account_stake_reward(account)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.inner.read().snapshot()
    }

    pub fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError> {
        self.commit(|ledger| ledger.transfer(sender, recipient, amount))
    }

    pub fn approve(
        &self,
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    ) -> Result<ApprovalReceipt, LedgerError> {
        self.commit(|ledger| ledger.approve(owner, spender, amount))
    }

    pub fn transfer_from(
        &self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError> {
        self.commit(|ledger| ledger.transfer_from(spender, from, to, amount))
    }

    pub fn stake_token(
        &self,
        staker: AccountId,
        amount: Amount,
        period_days: u64,
    ) -> Result<StakeReceipt, LedgerError> {
        self.commit(|ledger| ledger.stake_token(staker, amount, period_days))
    }

    pub fn claim_reward(&self, staker: AccountId) -> Result<ClaimReceipt, LedgerError> {
        self.commit(|ledger| ledger.claim_reward(staker))
    }

    /// Apply `op` under the write guard, then notify observers.
    fn commit<R: Receipt>(
        &self,
        op: impl FnOnce(&mut Ledger) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let receipt = {
            let mut ledger = self.inner.write();
            op(&mut ledger)?
        };
        self.dispatch(&receipt.events());
        Ok(receipt)
    }

    fn dispatch(&self, events: &[LedgerEvent]) {
        // Clone the list so observers can subscribe others re-entrantly.
        let observers: Vec<_> = self.observers.read().clone();
        for event in events {
            trace!(?event, observers = observers.len(), "dispatching event");
            for observer in &observers {
                observer.on_event(event);
            }
        }
    }
}
