//! # eddy-ledger
//!
//! The Eddy token ledger: reflected balances, the time-locked staking
//! pool, allowances and the fee-exemption list, plus a thread-safe
//! [`SharedLedger`] handle that delivers events to observers after each
//! operation commits.

pub mod config;
pub mod exemption;
pub mod ledger;
pub mod receipt;
pub mod shared;
pub mod snapshot;
pub mod staking;

pub use config::LedgerConfig;
pub use exemption::ExemptionList;
pub use ledger::{Ledger, UNLIMITED_ALLOWANCE};
pub use receipt::{ApprovalReceipt, ClaimReceipt, Receipt, StakeReceipt, TransferReceipt};
pub use shared::SharedLedger;
pub use snapshot::LedgerSnapshot;
pub use staking::{Stake, StakingPool};
