//! Genesis allocation.
//!
//! The genesis owner receives the entire reflected supply, which maps to
//! the entire real supply at the genesis rate. The owner is fee-exempt.

use serde::{Deserialize, Serialize};

use crate::constants::TOTAL_SUPPLY;
use crate::error::ConfigError;
use crate::types::{AccountId, Amount, Reflected, U256};

/// Genesis parameters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Genesis {
    /// Account minted the full supply.
    pub owner: AccountId,
    /// Fixed real total supply in wei.
    pub total_supply: Amount,
}

impl Genesis {
    /// Genesis with the default 10,000,000 EDDY supply.
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            total_supply: TOTAL_SUPPLY,
        }
    }

    pub fn with_supply(owner: AccountId, total_supply: Amount) -> Self {
        Self {
            owner,
            total_supply,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_supply == 0 {
            return Err(ConfigError::ZeroSupply);
        }
        if self.owner.is_zero() {
            return Err(ConfigError::NullOwner);
        }
        Ok(())
    }

    /// Initial reflected supply for this genesis.
    pub fn reflected_supply(&self) -> Reflected {
        initial_reflected_supply(self.total_supply)
    }
}

/// Largest multiple of `real_total` representable in 256 bits.
///
/// Being an exact multiple makes the genesis exchange rate an integer, so
/// the first conversions are lossless.
///
/// # Panics
///
/// Panics if `real_total` is zero; callers validate genesis first.
pub fn initial_reflected_supply(real_total: Amount) -> Reflected {
    let total = U256::from(real_total);
    U256::MAX - (U256::MAX % total)
}
