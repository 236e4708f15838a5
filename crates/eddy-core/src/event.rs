//! Ledger events delivered to observers after an operation commits.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Amount, FeeBreakdown, LockPeriod};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Tokens moved between accounts. `value` is the amount credited to `to`.
    Transfer {
        from: AccountId,
        to: AccountId,
        value: Amount,
    },
    /// Fee charged on a taxed transfer.
    FeeCollected { from: AccountId, fee: FeeBreakdown },
    Approval {
        owner: AccountId,
        spender: AccountId,
        value: Amount,
    },
    Staked {
        staker: AccountId,
        amount: Amount,
        period: LockPeriod,
        shares: Amount,
        unlock_time: u64,
    },
    RewardClaimed {
        staker: AccountId,
        principal: Amount,
        reward: Amount,
    },
}
