//! Shared fixtures for scenario, property and concurrency tests.

use std::sync::Arc;

use eddy_core::clock::ManualClock;
use eddy_core::constants::COIN;
use eddy_core::genesis::Genesis;
use eddy_core::types::{AccountId, Amount};
use eddy_ledger::{ExemptionList, Ledger, SharedLedger};
use eddy_reflect::FeePolicy;

/// Unix time every fixture clock starts at.
pub const GENESIS_TIME: u64 = 1_700_000_000;

/// Account id for a readable test label.
pub fn account(label: &str) -> AccountId {
    AccountId::from_label(label)
}

/// Whole tokens to wei.
pub fn tokens(n: u128) -> Amount {
    n * COIN
}

/// A default-configured ledger together with the handles a test drives it
/// through. The owner label is `"owner"` and is fee-exempt.
pub struct TestLedger {
    pub ledger: Ledger,
    pub clock: ManualClock,
    pub exemption: Arc<ExemptionList>,
    pub owner: AccountId,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::with_supply(eddy_core::constants::TOTAL_SUPPLY)
    }

    pub fn with_supply(total_supply: Amount) -> Self {
        let owner = account("owner");
        let clock = ManualClock::new(GENESIS_TIME);
        let exemption = Arc::new(ExemptionList::with_accounts([owner]));
        let ledger = Ledger::new(
            Genesis::with_supply(owner, total_supply),
            FeePolicy::default(),
            exemption.clone(),
            Arc::new(clock.clone()),
        )
        .expect("valid genesis");
        Self {
            ledger,
            clock,
            exemption,
            owner,
        }
    }

    /// Send `amount` fee-free from the owner to `label`.
    pub fn fund(&mut self, label: &str, amount: Amount) -> AccountId {
        let who = account(label);
        self.ledger
            .transfer(self.owner, who, amount)
            .expect("owner can fund");
        who
    }

    pub fn balance(&self, label: &str) -> Amount {
        self.ledger.balance_of(&account(label))
    }

    /// Hand the ledger to a [`SharedLedger`], keeping the clock.
    pub fn into_shared(self) -> (SharedLedger, ManualClock, AccountId) {
        (SharedLedger::new(self.ledger), self.clock, self.owner)
    }
}

impl Default for TestLedger {
    fn default() -> Self {
        Self::new()
    }
}
