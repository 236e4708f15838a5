//! Results of committed ledger operations.
//!
//! A receipt is produced only after every state change of its operation
//! has been applied; [`Receipt::events`] derives the events that observers
//! are told about afterwards.

use eddy_core::event::LedgerEvent;
use eddy_core::types::{AccountId, Amount, FeeBreakdown};

use crate::staking::Stake;

pub trait Receipt {
    fn events(&self) -> Vec<LedgerEvent>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from: AccountId,
    pub to: AccountId,
    pub fee: FeeBreakdown,
}

impl Receipt for TransferReceipt {
    fn events(&self) -> Vec<LedgerEvent> {
        let mut events = vec![LedgerEvent::Transfer {
            from: self.from,
            to: self.to,
            value: self.fee.net,
        }];
        if !self.fee.is_fee_free() {
            events.push(LedgerEvent::FeeCollected {
                from: self.from,
                fee: self.fee,
            });
        }
        events
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalReceipt {
    pub owner: AccountId,
    pub spender: AccountId,
    pub value: Amount,
}

impl Receipt for ApprovalReceipt {
    fn events(&self) -> Vec<LedgerEvent> {
        vec![LedgerEvent::Approval {
            owner: self.owner,
            spender: self.spender,
            value: self.value,
        }]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeReceipt {
    pub stake: Stake,
}

impl Receipt for StakeReceipt {
    fn events(&self) -> Vec<LedgerEvent> {
        vec![LedgerEvent::Staked {
            staker: self.stake.owner,
            amount: self.stake.principal,
            period: self.stake.period,
            shares: self.stake.shares,
            unlock_time: self.stake.unlock_time(),
        }]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub staker: AccountId,
    pub principal: Amount,
    pub reward: Amount,
}

impl Receipt for ClaimReceipt {
    fn events(&self) -> Vec<LedgerEvent> {
        vec![LedgerEvent::RewardClaimed {
            staker: self.staker,
            principal: self.principal,
            reward: self.reward,
        }]
    }
}
