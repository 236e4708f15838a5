//! Serializable point-in-time copy of ledger state.
//!
//! Maps are flattened into sorted vectors so the snapshot serializes to
//! JSON (whose object keys must be strings) and compares deterministically.
//! Collaborators (exemption source, clock) are not part of a snapshot and
//! are supplied again on restore.

use std::collections::HashMap;
use std::sync::Arc;

use eddy_core::error::{EddyError, InvariantViolation};
use eddy_core::traits::{FeeExemption, TimeSource};
use eddy_core::types::{AccountId, Amount, Reflected};
use eddy_reflect::{FeePolicy, RedistributionEngine};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ledger::Ledger;
use crate::staking::{Stake, StakingPool};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AllowanceEntry {
    pub owner: AccountId,
    pub spender: AccountId,
    pub amount: Amount,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub real_total_supply: Amount,
    pub reflected_total_supply: Reflected,
    pub fees: FeePolicy,
    /// Sorted by account.
    pub balances: Vec<(AccountId, Reflected)>,
    /// Sorted by `(owner, spender)`.
    pub allowances: Vec<AllowanceEntry>,
    /// Active stakes, sorted by owner.
    pub stakes: Vec<Stake>,
    pub total_reward_pool: Amount,
    pub custody_reflected: Reflected,
    /// Sorted by account.
    pub last_rewards: Vec<(AccountId, Amount)>,
}

impl Ledger {
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut balances: Vec<_> = self.balances.iter().map(|(a, r)| (*a, *r)).collect();
        balances.sort_by_key(|(a, _)| *a);

        let mut allowances: Vec<_> = self
            .allowances
            .iter()
            .map(|((owner, spender), amount)| AllowanceEntry {
                owner: *owner,
                spender: *spender,
                amount: *amount,
            })
            .collect();
        allowances.sort_by_key(|e| (e.owner, e.spender));

        let mut stakes: Vec<Stake> = self.pool.stakes().cloned().collect();
        stakes.sort_by_key(|s| s.owner);

        let mut last_rewards: Vec<_> = self.pool.last_rewards().map(|(a, r)| (*a, *r)).collect();
        last_rewards.sort_by_key(|(a, _)| *a);

        LedgerSnapshot {
            real_total_supply: self.real_total_supply,
            reflected_total_supply: self.reflected_total_supply,
            fees: self.fees,
            balances,
            allowances,
            stakes,
            total_reward_pool: self.pool.total_reward_pool(),
            custody_reflected: self.pool.custody_reflected(),
            last_rewards,
        }
    }

    /// Rebuild a ledger from a snapshot and verify its invariants.
    ///
    /// # Errors
    ///
    /// [`EddyError::Invariant`] if the snapshot is inconsistent, or
    /// [`EddyError::Ledger`] if its staking state cannot be rebuilt.
    pub fn restore(
        snapshot: LedgerSnapshot,
        exemption: Arc<dyn FeeExemption>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, EddyError> {
        if snapshot.real_total_supply == 0 || snapshot.reflected_total_supply.is_zero() {
            return Err(InvariantViolation::ZeroSupply.into());
        }

        let pool = StakingPool::from_parts(
            snapshot.stakes,
            snapshot.total_reward_pool,
            snapshot.custody_reflected,
            snapshot.last_rewards,
        )?;

        let balances: HashMap<_, _> = snapshot
            .balances
            .into_iter()
            .filter(|(_, r)| !r.is_zero())
            .collect();
        let allowances: HashMap<_, _> = snapshot
            .allowances
            .into_iter()
            .filter(|e| e.amount != 0)
            .map(|e| ((e.owner, e.spender), e.amount))
            .collect();

        let ledger = Self {
            real_total_supply: snapshot.real_total_supply,
            reflected_total_supply: snapshot.reflected_total_supply,
            balances,
            allowances,
            pool,
            fees: snapshot.fees,
            engine: RedistributionEngine::new(),
            exemption,
            clock,
        };
        ledger.check_invariants()?;

        info!(
            holders = ledger.holder_count(),
            stakes = ledger.pool.stake_count(),
            "ledger restored"
        );
        Ok(ledger)
    }
}
