//! Time-locked, weight-adjusted staking pool.
//!
//! The pool holds two kinds of value in custody, both outside general
//! circulation: locked principal of active stakes, and the reward pool fed
//! by the staking half of transfer fees. Rewards are resolved at claim time
//! against the *current* pool and share totals:
//!
//! ```text
//! reward = total_reward_pool * stake.shares / total_shares
//! ```
//!
//! Because the pool and the share total shrink together on every claim,
//! co-starting stakers with no accrual in between split the pool in
//! proportion to their shares, whatever order they claim in (up to one wei
//! of floor rounding per claim, which the last claimer absorbs).
//!
//! Mutation is two-phase: `prepare_*` validates and computes without
//! touching state, `commit_*` applies a prepared result and cannot fail.

use std::collections::HashMap;

use eddy_core::error::LedgerError;
use eddy_core::types::{AccountId, Amount, LockPeriod, Reflected, U256};
use serde::{Deserialize, Serialize};

/// A single locked stake.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Stake {
    pub owner: AccountId,
    /// Real amount locked out of the owner's spendable balance.
    pub principal: Amount,
    pub period: LockPeriod,
    /// `principal * period.weight()`.
    pub shares: Amount,
    /// Unix seconds at creation.
    pub start_time: u64,
    pub active: bool,
}

impl Stake {
    /// Earliest time at which the stake may be claimed.
    pub fn unlock_time(&self) -> u64 {
        self.start_time.saturating_add(self.period.duration_secs())
    }

    pub fn is_unlocked(&self, now: u64) -> bool {
        now >= self.unlock_time()
    }
}

/// A validated claim awaiting commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimPlan {
    pub owner: AccountId,
    pub principal: Amount,
    pub reward: Amount,
    pub shares: Amount,
}

impl ClaimPlan {
    /// Total real amount returned to the staker.
    pub fn payout(&self) -> Amount {
        self.principal + self.reward
    }
}

/// Staking pool state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakingPool {
    /// Active stakes, at most one per owner.
    stakes: HashMap<AccountId, Stake>,
    total_shares: Amount,
    total_reward_pool: Amount,
    total_principal: Amount,
    /// Reflected units held in custody for principal and rewards.
    custody_reflected: Reflected,
    /// Reward credited by each owner's most recent claim.
    last_rewards: HashMap<AccountId, Amount>,
}

impl StakingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a pool from persisted parts. Totals are recomputed from the
    /// stakes; inactive stakes are dropped and duplicate owners rejected.
    pub(crate) fn from_parts(
        stakes: Vec<Stake>,
        total_reward_pool: Amount,
        custody_reflected: Reflected,
        last_rewards: Vec<(AccountId, Amount)>,
    ) -> Result<Self, LedgerError> {
        let mut pool = Self {
            total_reward_pool,
            custody_reflected,
            last_rewards: last_rewards.into_iter().collect(),
            ..Self::default()
        };
        for stake in stakes.into_iter().filter(|s| s.active) {
            pool.total_shares = pool
                .total_shares
                .checked_add(stake.shares)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            pool.total_principal = pool
                .total_principal
                .checked_add(stake.principal)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            if pool.stakes.insert(stake.owner, stake).is_some() {
                return Err(LedgerError::AlreadyStaked);
            }
        }
        Ok(pool)
    }

    pub fn total_shares(&self) -> Amount {
        self.total_shares
    }

    pub fn total_reward_pool(&self) -> Amount {
        self.total_reward_pool
    }

    /// Sum of principal over active stakes.
    pub fn total_principal(&self) -> Amount {
        self.total_principal
    }

    /// Real value held outside circulation.
    pub fn custody_real(&self) -> Amount {
        self.total_principal + self.total_reward_pool
    }

    pub fn custody_reflected(&self) -> Reflected {
        self.custody_reflected
    }

    pub fn active_stake(&self, owner: &AccountId) -> Option<&Stake> {
        self.stakes.get(owner)
    }

    pub fn stakes(&self) -> impl Iterator<Item = &Stake> {
        self.stakes.values()
    }

    pub fn stake_count(&self) -> usize {
        self.stakes.len()
    }

    /// Reward credited by `owner`'s most recent claim, zero if none.
    pub fn last_reward(&self, owner: &AccountId) -> Amount {
        self.last_rewards.get(owner).copied().unwrap_or(0)
    }

    pub(crate) fn last_rewards(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.last_rewards.iter()
    }

    /// Add the staking half of a transfer fee to the reward pool.
    pub fn accrue(&mut self, amount: Amount, reflected: Reflected) {
        self.total_reward_pool += amount;
        self.custody_reflected += reflected;
    }

    /// Validate a new stake and build it without mutating the pool.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AlreadyStaked`] if `owner` has an active stake
    /// - [`LedgerError::ZeroStake`] if `amount` is zero
    /// - [`LedgerError::ArithmeticOverflow`] if shares overflow
    pub fn prepare_stake(
        &self,
        owner: AccountId,
        amount: Amount,
        period: LockPeriod,
        now: u64,
    ) -> Result<Stake, LedgerError> {
        if self.stakes.contains_key(&owner) {
            return Err(LedgerError::AlreadyStaked);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroStake);
        }
        let shares = amount
            .checked_mul(period.weight())
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.total_shares
            .checked_add(shares)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        Ok(Stake {
            owner,
            principal: amount,
            period,
            shares,
            start_time: now,
            active: true,
        })
    }

    /// Lock a prepared stake into custody.
    pub fn commit_stake(&mut self, stake: Stake, reflected: Reflected) {
        self.total_shares += stake.shares;
        self.total_principal += stake.principal;
        self.custody_reflected += reflected;
        self.stakes.insert(stake.owner, stake);
    }

    /// Validate a claim and compute its reward without mutating the pool.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotStaked`] if `owner` has no active stake
    /// - [`LedgerError::TooEarly`] if the lock period has not elapsed
    pub fn prepare_claim(&self, owner: &AccountId, now: u64) -> Result<ClaimPlan, LedgerError> {
        let stake = self.stakes.get(owner).ok_or(LedgerError::NotStaked)?;
        if !stake.is_unlocked(now) {
            return Err(LedgerError::TooEarly);
        }

        let reward = proportional_reward(self.total_reward_pool, stake.shares, self.total_shares)?;
        Ok(ClaimPlan {
            owner: *owner,
            principal: stake.principal,
            reward,
            shares: stake.shares,
        })
    }

    /// Release a prepared claim: `reflected_paid` leaves custody and
    /// `reward_paid` is recorded as the owner's last reward. The stake's
    /// full entitlement leaves the reward pool either way.
    pub fn commit_claim(
        &mut self,
        plan: &ClaimPlan,
        reflected_paid: Reflected,
        reward_paid: Amount,
    ) {
        self.total_reward_pool -= plan.reward;
        self.total_shares -= plan.shares;
        self.total_principal -= plan.principal;
        self.custody_reflected -= reflected_paid;
        // Finalized stakes leave the active set; they are never reactivated.
        self.stakes.remove(&plan.owner);
        self.last_rewards.insert(plan.owner, reward_paid);
    }
}

/// `floor(pool * shares / total_shares)` with a 256-bit intermediate.
fn proportional_reward(pool: Amount, shares: Amount, total_shares: Amount) -> Result<Amount, LedgerError> {
    if total_shares == 0 {
        return Ok(0);
    }
    let reward = U256::from(pool) * U256::from(shares) / U256::from(total_shares);
    // shares <= total_shares, so reward <= pool.
    if reward > U256::from(pool) {
        return Err(LedgerError::ArithmeticOverflow);
    }
    Ok(reward.as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::constants::{COIN, SECONDS_PER_DAY};

    const T0: u64 = 1_700_000_000;

    fn acct(label: &str) -> AccountId {
        AccountId::from_label(label)
    }

    fn stake_into(pool: &mut StakingPool, owner: &str, amount: Amount, period: LockPeriod) {
        let stake = pool.prepare_stake(acct(owner), amount, period, T0).unwrap();
        pool.commit_stake(stake, U256::from(amount));
    }

    fn claim(pool: &mut StakingPool, owner: &str, now: u64) -> Amount {
        let plan = pool.prepare_claim(&acct(owner), now).unwrap();
        let paid = U256::from(plan.payout()).min(pool.custody_reflected());
        pool.commit_claim(&plan, paid, plan.reward);
        plan.reward
    }

    #[test]
    fn stake_computes_weighted_shares() {
        let pool = StakingPool::new();
        let s = pool
            .prepare_stake(acct("a"), 100 * COIN, LockPeriod::FourteenDays, T0)
            .unwrap();
        assert_eq!(s.shares, 300 * COIN);
        assert_eq!(s.unlock_time(), T0 + 14 * SECONDS_PER_DAY);
        assert!(s.active);
    }

    #[test]
    fn second_stake_rejected() {
        let mut pool = StakingPool::new();
        stake_into(&mut pool, "a", 100, LockPeriod::ThirtyDays);
        assert_eq!(
            pool.prepare_stake(acct("a"), 5, LockPeriod::FourteenDays, T0),
            Err(LedgerError::AlreadyStaked)
        );
    }

    #[test]
    fn zero_stake_rejected() {
        let pool = StakingPool::new();
        assert_eq!(
            pool.prepare_stake(acct("a"), 0, LockPeriod::ThirtyDays, T0),
            Err(LedgerError::ZeroStake)
        );
    }

    #[test]
    fn share_overflow_rejected() {
        let pool = StakingPool::new();
        assert_eq!(
            pool.prepare_stake(acct("a"), u128::MAX / 2, LockPeriod::ThirtyDays, T0),
            Err(LedgerError::ArithmeticOverflow)
        );
    }

    #[test]
    fn claim_without_stake() {
        let pool = StakingPool::new();
        assert_eq!(pool.prepare_claim(&acct("a"), T0), Err(LedgerError::NotStaked));
    }

    #[test]
    fn claim_lock_boundary() {
        let mut pool = StakingPool::new();
        stake_into(&mut pool, "a", 100, LockPeriod::FourteenDays);
        let unlock = T0 + 14 * SECONDS_PER_DAY;
        assert_eq!(pool.prepare_claim(&acct("a"), unlock - 1), Err(LedgerError::TooEarly));
        assert!(pool.prepare_claim(&acct("a"), unlock).is_ok());
    }

    #[test]
    fn sole_staker_takes_whole_pool() {
        let mut pool = StakingPool::new();
        pool.accrue(250 * COIN, U256::from(250u64));
        stake_into(&mut pool, "a", 5_000 * COIN, LockPeriod::ThirtyDays);
        let reward = claim(&mut pool, "a", T0 + 31 * SECONDS_PER_DAY);
        assert_eq!(reward, 250 * COIN);
        assert_eq!(pool.total_reward_pool(), 0);
        assert_eq!(pool.total_shares(), 0);
        assert_eq!(pool.last_reward(&acct("a")), 250 * COIN);
    }

    #[test]
    fn weighted_claims_three_to_seven() {
        let mut pool = StakingPool::new();
        pool.accrue(250 * COIN, U256::zero());
        stake_into(&mut pool, "a", 100 * COIN, LockPeriod::FourteenDays);
        stake_into(&mut pool, "b", 100 * COIN, LockPeriod::ThirtyDays);
        let later = T0 + 31 * SECONDS_PER_DAY;
        let ra = claim(&mut pool, "a", later);
        let rb = claim(&mut pool, "b", later);
        assert_eq!(ra * 7, rb * 3);
        assert_eq!(ra + rb, 250 * COIN);
    }

    #[test]
    fn claim_order_does_not_change_rewards() {
        let later = T0 + 31 * SECONDS_PER_DAY;
        let run = |order: &[&str]| {
            let mut pool = StakingPool::new();
            // One wei of reward per wei of shares keeps every division exact.
            pool.accrue(2_750 * COIN, U256::zero());
            stake_into(&mut pool, "a", 100 * COIN, LockPeriod::FourteenDays);
            stake_into(&mut pool, "b", 300 * COIN, LockPeriod::ThirtyDays);
            stake_into(&mut pool, "c", 50 * COIN, LockPeriod::ThirtyDays);
            for who in order {
                claim(&mut pool, who, later);
            }
            ["a", "b", "c"].map(|w| pool.last_reward(&acct(w)))
        };
        let forward = run(&["a", "b", "c"]);
        let backward = run(&["c", "b", "a"]);
        let shuffled = run(&["b", "a", "c"]);
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn double_claim_rejected() {
        let mut pool = StakingPool::new();
        stake_into(&mut pool, "a", 100, LockPeriod::FourteenDays);
        let later = T0 + 15 * SECONDS_PER_DAY;
        claim(&mut pool, "a", later);
        assert_eq!(pool.prepare_claim(&acct("a"), later), Err(LedgerError::NotStaked));
        assert!(pool.active_stake(&acct("a")).is_none());
    }

    #[test]
    fn restake_after_claim() {
        let mut pool = StakingPool::new();
        stake_into(&mut pool, "a", 100, LockPeriod::FourteenDays);
        claim(&mut pool, "a", T0 + 15 * SECONDS_PER_DAY);
        assert!(pool
            .prepare_stake(acct("a"), 100, LockPeriod::ThirtyDays, T0)
            .is_ok());
    }

    #[test]
    fn from_parts_recomputes_totals() {
        let stakes = vec![
            Stake {
                owner: acct("a"),
                principal: 10,
                period: LockPeriod::FourteenDays,
                shares: 30,
                start_time: T0,
                active: true,
            },
            Stake {
                owner: acct("b"),
                principal: 99,
                period: LockPeriod::ThirtyDays,
                shares: 693,
                start_time: T0,
                active: false,
            },
        ];
        let pool = StakingPool::from_parts(stakes, 7, U256::from(17u8), vec![]).unwrap();
        assert_eq!(pool.total_shares(), 30);
        assert_eq!(pool.total_principal(), 10);
        assert_eq!(pool.custody_real(), 17);
        assert_eq!(pool.stake_count(), 1);
    }
}
