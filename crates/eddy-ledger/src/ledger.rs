//! The reflection ledger.
//!
//! Balances are stored in reflected units; a holder's real balance is
//! `reflected * circulating_real / circulating_reflected`, where the
//! circulating figures exclude the staking pool's custody. Shrinking the
//! reflected supply therefore raises every circulating balance at once.
//!
//! Every mutating operation runs in two phases: all checks and
//! conversions happen against one [`Rate`] snapshot, and state is only
//! written once nothing else can fail. An error leaves the ledger
//! untouched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use eddy_core::constants::{DECIMALS, TOKEN_NAME, TOKEN_SYMBOL};
use eddy_core::error::{ConfigError, InvariantViolation, LedgerError};
use eddy_core::genesis::Genesis;
use eddy_core::traits::{FeeCalculator, FeeExemption, TimeSource};
use eddy_core::types::{AccountId, Amount, LockPeriod, Reflected, U256};
use eddy_reflect::{FeePolicy, Rate, RedistributionEngine};
use tracing::{debug, info, warn};

use crate::receipt::{ApprovalReceipt, ClaimReceipt, StakeReceipt, TransferReceipt};
use crate::staking::{Stake, StakingPool};

/// Allowance value that is never decremented.
pub const UNLIMITED_ALLOWANCE: Amount = Amount::MAX;

/// Token ledger with reflection and a staking pool.
///
/// Not thread-safe on its own; wrap in [`SharedLedger`](crate::SharedLedger)
/// for concurrent access.
pub struct Ledger {
    /// Fixed at genesis.
    pub(crate) real_total_supply: Amount,
    /// Only ever decreases.
    pub(crate) reflected_total_supply: Reflected,
    /// Nonzero reflected balances only.
    pub(crate) balances: HashMap<AccountId, Reflected>,
    /// `(owner, spender)` → remaining allowance.
    pub(crate) allowances: HashMap<(AccountId, AccountId), Amount>,
    pub(crate) pool: StakingPool,
    pub(crate) fees: FeePolicy,
    pub(crate) engine: RedistributionEngine,
    pub(crate) exemption: Arc<dyn FeeExemption>,
    pub(crate) clock: Arc<dyn TimeSource>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("real_total_supply", &self.real_total_supply)
            .field("reflected_total_supply", &self.reflected_total_supply)
            .field("holders", &self.balances.len())
            .field("stakes", &self.pool.stake_count())
            .field("fees", &self.fees)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Mint the full supply to `genesis.owner`.
    ///
    /// The owner's fee exemption is the exemption source's business; seed
    /// an [`ExemptionList`](crate::ExemptionList) with the owner to get the
    /// usual behaviour.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the genesis parameters are invalid.
    pub fn new(
        genesis: Genesis,
        fees: FeePolicy,
        exemption: Arc<dyn FeeExemption>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        genesis.validate()?;
        let reflected_total_supply = genesis.reflected_supply();

        let mut balances = HashMap::new();
        balances.insert(genesis.owner, reflected_total_supply);

        info!(
            owner = %genesis.owner,
            total_supply = genesis.total_supply,
            fee_bps = fees.fee_bps(),
            "ledger created"
        );

        Ok(Self {
            real_total_supply: genesis.total_supply,
            reflected_total_supply,
            balances,
            allowances: HashMap::new(),
            pool: StakingPool::new(),
            fees,
            engine: RedistributionEngine::new(),
            exemption,
            clock,
        })
    }

    // ------------------------------------------------------------------
    // Token metadata and balances
    // ------------------------------------------------------------------

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// Fixed real supply.
    pub fn total_supply(&self) -> Amount {
        self.real_total_supply
    }

    pub fn reflected_total_supply(&self) -> Reflected {
        self.reflected_total_supply
    }

    pub fn reflected_balance(&self, account: &AccountId) -> Reflected {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Current circulating exchange rate.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RateUnderflow`] if the ledger has no supply.
    pub fn rate(&self) -> Result<Rate, LedgerError> {
        Rate::circulating(
            self.reflected_total_supply,
            self.real_total_supply,
            self.pool.custody_reflected(),
            self.pool.custody_real(),
        )
    }

    /// Spendable real balance. Staked principal is not included.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        let reflected = self.reflected_balance(account);
        if reflected.is_zero() {
            return 0;
        }
        self.rate().map(|rate| rate.to_real(reflected)).unwrap_or(0)
    }

    /// Number of accounts holding a nonzero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    pub fn fee_policy(&self) -> &FeePolicy {
        &self.fees
    }

    pub fn is_fee_exempt(&self, account: &AccountId) -> bool {
        self.exemption.is_fee_exempt(account)
    }

    // ------------------------------------------------------------------
    // Staking queries
    // ------------------------------------------------------------------

    pub fn stake_total_share(&self) -> Amount {
        self.pool.total_shares()
    }

    /// Undistributed staking rewards.
    pub fn stake_total_reward(&self) -> Amount {
        self.pool.total_reward_pool()
    }

    /// Reward credited by `account`'s most recent claim.
    pub fn account_stake_reward(&self, account: &AccountId) -> Amount {
        self.pool.last_reward(account)
    }

    pub fn stake_of(&self, account: &AccountId) -> Option<&Stake> {
        self.pool.active_stake(account)
    }

    pub fn stake_unlock_time(&self, account: &AccountId) -> Option<u64> {
        self.pool.active_stake(account).map(Stake::unlock_time)
    }

    /// Principal locked across all active stakes.
    pub fn total_staked(&self) -> Amount {
        self.pool.total_principal()
    }

    pub fn staking_pool(&self) -> &StakingPool {
        &self.pool
    }

    // ------------------------------------------------------------------
    // Transfers
    // ------------------------------------------------------------------

    /// Move `amount` from `sender` to `recipient`, charging the transfer
    /// fee unless the sender is exempt.
    ///
    /// The recipient is credited `amount - fee`. The reflection half of
    /// the fee is redistributed to all circulating holders; the staking
    /// half moves into the reward pool.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidRecipient`] if `recipient` is the null account
    /// - [`LedgerError::InsufficientBalance`] if `amount` exceeds the sender's balance
    /// - [`LedgerError::RateUnderflow`] if redistribution would empty the reflected supply
    pub fn transfer(
        &mut self,
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError> {
        if recipient.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }

        let rate = self.rate()?;
        let sender_reflected = self.reflected_balance(&sender);
        if amount > rate.to_real(sender_reflected) {
            return Err(LedgerError::InsufficientBalance);
        }

        let fee = self
            .fees
            .compute_for(self.exemption.as_ref(), &sender, amount)?;

        let r_amount = rate.to_reflected(amount)?;
        let r_net = rate.to_reflected(fee.net)?;
        let r_staking = rate.to_reflected(fee.staking_fee)?;
        // Conversion dust rides along with the reflection fee so reflected
        // units stay balanced exactly.
        let r_reflection = r_amount
            .checked_sub(r_net)
            .and_then(|r| r.checked_sub(r_staking))
            .ok_or(LedgerError::ArithmeticOverflow)?;

        let new_reflected_supply = self
            .engine
            .apply_redistribution(self.reflected_total_supply, r_reflection)?;
        let sender_after = sender_reflected
            .checked_sub(r_amount)
            .ok_or(LedgerError::InsufficientBalance)?;

        // Commit.
        self.set_reflected(sender, sender_after);
        self.credit(recipient, r_net);
        self.reflected_total_supply = new_reflected_supply;
        self.pool.accrue(fee.staking_fee, r_staking);

        debug!(
            %sender,
            %recipient,
            amount,
            net = fee.net,
            reflection_fee = fee.reflection_fee,
            staking_fee = fee.staking_fee,
            "transfer"
        );

        Ok(TransferReceipt {
            from: sender,
            to: recipient,
            fee,
        })
    }

    /// Set `spender`'s allowance over `owner`'s balance. A zero amount
    /// clears it; [`UNLIMITED_ALLOWANCE`] is never consumed.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidSpender`] if `spender` is the null account.
    pub fn approve(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    ) -> Result<ApprovalReceipt, LedgerError> {
        if spender.is_zero() {
            return Err(LedgerError::InvalidSpender);
        }
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
        debug!(%owner, %spender, amount, "approve");
        Ok(ApprovalReceipt {
            owner,
            spender,
            value: amount,
        })
    }

    /// Transfer on behalf of `from`, consuming `spender`'s allowance.
    ///
    /// The allowance is reduced only when the transfer itself succeeds.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientAllowance`], or any error of
    /// [`transfer`](Self::transfer).
    pub fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError> {
        let allowed = self.allowance(&from, &spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance);
        }

        let receipt = self.transfer(from, to, amount)?;

        if allowed != UNLIMITED_ALLOWANCE {
            let remaining = allowed - amount;
            if remaining == 0 {
                self.allowances.remove(&(from, spender));
            } else {
                self.allowances.insert((from, spender), remaining);
            }
        }
        Ok(receipt)
    }

    // ------------------------------------------------------------------
    // Staking
    // ------------------------------------------------------------------

    /// Lock `amount` of `staker`'s balance for `period_days`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientBalanceToStake`] if `amount` exceeds the balance
    /// - [`LedgerError::InvalidPeriod`] unless `period_days` is 14 or 30
    /// - [`LedgerError::AlreadyStaked`] if the staker has an active stake
    /// - [`LedgerError::ZeroStake`] if `amount` is zero
    pub fn stake_token(
        &mut self,
        staker: AccountId,
        amount: Amount,
        period_days: u64,
    ) -> Result<StakeReceipt, LedgerError> {
        let rate = self.rate()?;
        let staker_reflected = self.reflected_balance(&staker);
        if amount > rate.to_real(staker_reflected) {
            return Err(LedgerError::InsufficientBalanceToStake);
        }

        let period = LockPeriod::from_days(period_days)?;
        let stake = self
            .pool
            .prepare_stake(staker, amount, period, self.clock.now())?;

        let r_locked = rate.to_reflected(amount)?;
        let staker_after = staker_reflected
            .checked_sub(r_locked)
            .ok_or(LedgerError::InsufficientBalanceToStake)?;

        // Commit.
        self.set_reflected(staker, staker_after);
        self.pool.commit_stake(stake.clone(), r_locked);

        info!(
            %staker,
            amount,
            %period,
            shares = stake.shares,
            unlock_time = stake.unlock_time(),
            "staked"
        );

        Ok(StakeReceipt { stake })
    }

    /// Return `staker`'s principal plus their share of the reward pool.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotStaked`] if the staker has no active stake
    /// - [`LedgerError::TooEarly`] if the lock period has not elapsed
    pub fn claim_reward(&mut self, staker: AccountId) -> Result<ClaimReceipt, LedgerError> {
        let plan = self.pool.prepare_claim(&staker, self.clock.now())?;

        let rate = self.rate()?;
        let custody = self.pool.custody_reflected();
        let owed = rate.to_reflected(plan.payout())?;
        let (r_paid, reward) = if owed > custody {
            // Whatever custody covers goes to principal first.
            let reward = rate
                .to_real(custody)
                .saturating_sub(plan.principal)
                .min(plan.reward);
            warn!(
                %staker,
                %owed,
                %custody,
                owed_reward = plan.reward,
                reward,
                "claim payout clamped to custody"
            );
            (custody, reward)
        } else {
            (owed, plan.reward)
        };

        // Commit.
        self.credit(staker, r_paid);
        self.pool.commit_claim(&plan, r_paid, reward);

        info!(
            %staker,
            principal = plan.principal,
            reward,
            "reward claimed"
        );

        Ok(ClaimReceipt {
            staker,
            principal: plan.principal,
            reward,
        })
    }

    // ------------------------------------------------------------------
    // Consistency
    // ------------------------------------------------------------------

    /// Verify the ledger's bookkeeping invariants.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.real_total_supply == 0 || self.reflected_total_supply.is_zero() {
            return Err(InvariantViolation::ZeroSupply);
        }

        let accounts = self
            .balances
            .values()
            .fold(U256::zero(), |acc, r| acc.saturating_add(*r));
        let custody = self.pool.custody_reflected();
        if accounts.saturating_add(custody) != self.reflected_total_supply {
            return Err(InvariantViolation::ReflectedMismatch {
                accounts: accounts.to_string(),
                custody: custody.to_string(),
                supply: self.reflected_total_supply.to_string(),
            });
        }

        for stake in self.pool.stakes() {
            if stake.principal == 0 {
                return Err(InvariantViolation::EmptyStake {
                    owner: stake.owner.to_string(),
                });
            }
            let expected = U256::from(stake.principal) * U256::from(stake.period.weight());
            if U256::from(stake.shares) != expected {
                return Err(InvariantViolation::StakeSharesMismatch {
                    owner: stake.owner.to_string(),
                    recorded: stake.shares,
                    expected: expected.to_string(),
                });
            }
        }

        let (shares, principal) = self.pool.stakes().fold((0u128, 0u128), |(s, p), stake| {
            (s.saturating_add(stake.shares), p.saturating_add(stake.principal))
        });
        if shares != self.pool.total_shares() {
            return Err(InvariantViolation::SharesMismatch {
                recorded: self.pool.total_shares(),
                actual: shares,
            });
        }
        if principal != self.pool.total_principal() {
            return Err(InvariantViolation::PrincipalMismatch {
                recorded: self.pool.total_principal(),
                actual: principal,
            });
        }

        let custody_real = self
            .pool
            .total_principal()
            .saturating_add(self.pool.total_reward_pool());
        if custody_real > self.real_total_supply {
            return Err(InvariantViolation::CustodyExceedsSupply {
                custody: custody_real,
                supply: self.real_total_supply,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn set_reflected(&mut self, account: AccountId, reflected: Reflected) {
        if reflected.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, reflected);
        }
    }

    fn credit(&mut self, account: AccountId, reflected: Reflected) {
        if reflected.is_zero() {
            return;
        }
        let balance = self.balances.entry(account).or_default();
        *balance = balance.saturating_add(reflected);
    }
}
