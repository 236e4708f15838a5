//! Core ledger types: account identities, amounts, lock periods, fee splits.
//!
//! Real (user-facing) amounts are `u128` wei. Reflected amounts are
//! 256-bit and only meaningful relative to the current exchange rate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    LONG_LOCK_DAYS, LONG_LOCK_WEIGHT, SECONDS_PER_DAY, SHORT_LOCK_DAYS, SHORT_LOCK_WEIGHT,
};
use crate::error::{AccountIdError, LedgerError};

pub use primitive_types::{U256, U512};

/// Real token amount in wei.
pub type Amount = u128;

/// Internal reflected amount.
pub type Reflected = U256;

/// A 32-byte account identity.
///
/// The all-zero identity is the null account; transfers to it are rejected.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// The null identity.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic identity from a human-readable label.
    ///
    /// Used by the simulator and tests to name accounts ("owner", "alice").
    pub fn from_label(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AccountIdError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AccountIdError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Whitelisted staking lock periods.
///
/// Each period maps to a fixed share weight: a stake's shares are
/// `principal * weight`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockPeriod {
    /// 14 days, weight 3.
    FourteenDays,
    /// 30 days, weight 7.
    ThirtyDays,
}

impl LockPeriod {
    pub const ALL: [LockPeriod; 2] = [LockPeriod::FourteenDays, LockPeriod::ThirtyDays];

    /// Resolve a period from its length in days.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidPeriod`] if `days` is not whitelisted.
    pub fn from_days(days: u64) -> Result<Self, LedgerError> {
        match days {
            SHORT_LOCK_DAYS => Ok(Self::FourteenDays),
            LONG_LOCK_DAYS => Ok(Self::ThirtyDays),
            other => Err(LedgerError::InvalidPeriod(other)),
        }
    }

    pub fn days(&self) -> u64 {
        match self {
            Self::FourteenDays => SHORT_LOCK_DAYS,
            Self::ThirtyDays => LONG_LOCK_DAYS,
        }
    }

    pub fn weight(&self) -> u128 {
        match self {
            Self::FourteenDays => SHORT_LOCK_WEIGHT,
            Self::ThirtyDays => LONG_LOCK_WEIGHT,
        }
    }

    /// Lock length in seconds.
    pub fn duration_secs(&self) -> u64 {
        self.days() * SECONDS_PER_DAY
    }
}

impl fmt::Display for LockPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

/// Breakdown of a transfer amount into fee components, in real units.
///
/// Invariant: `net + reflection_fee + staking_fee == amount`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FeeBreakdown {
    pub amount: Amount,
    pub net: Amount,
    pub reflection_fee: Amount,
    pub staking_fee: Amount,
}

impl FeeBreakdown {
    /// A fee-free breakdown (exempt sender).
    pub fn exempt(amount: Amount) -> Self {
        Self {
            amount,
            net: amount,
            reflection_fee: 0,
            staking_fee: 0,
        }
    }

    /// Total fee charged.
    pub fn fee(&self) -> Amount {
        self.reflection_fee + self.staking_fee
    }

    pub fn is_fee_free(&self) -> bool {
        self.fee() == 0
    }
}
