//! Transfer fee policy implementing the [`FeeCalculator`] trait.
//!
//! `fee = floor(amount * fee_bps / BPS_PRECISION)`, split into a reflection
//! half and a staking half. The staking half takes any odd remainder.

use eddy_core::constants::{BPS_PRECISION, REFLECTION_SHARE_BPS, TRANSFER_FEE_BPS};
use eddy_core::error::{ConfigError, LedgerError};
use eddy_core::traits::FeeCalculator;
use eddy_core::types::{Amount, FeeBreakdown};
use serde::{Deserialize, Serialize};

/// Fixed-rate fee policy. Holds no mutable state.
///
/// Deserialization goes through [`FeePolicy::new`], so a persisted policy
/// with out-of-range rates is rejected on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FeeRates")]
pub struct FeePolicy {
    fee_bps: u64,
    reflection_share_bps: u64,
}

/// Unvalidated wire form of [`FeePolicy`].
#[derive(Deserialize)]
struct FeeRates {
    fee_bps: u64,
    reflection_share_bps: u64,
}

impl TryFrom<FeeRates> for FeePolicy {
    type Error = ConfigError;

    fn try_from(rates: FeeRates) -> Result<Self, Self::Error> {
        Self::new(rates.fee_bps, rates.reflection_share_bps)
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            fee_bps: TRANSFER_FEE_BPS,
            reflection_share_bps: REFLECTION_SHARE_BPS,
        }
    }
}

impl FeePolicy {
    /// Create a policy with custom rates.
    ///
    /// # Errors
    ///
    /// [`ConfigError::RateOutOfRange`] if either rate exceeds `BPS_PRECISION`.
    pub fn new(fee_bps: u64, reflection_share_bps: u64) -> Result<Self, ConfigError> {
        if fee_bps > BPS_PRECISION {
            return Err(ConfigError::RateOutOfRange {
                name: "fee_bps",
                value: fee_bps,
                max: BPS_PRECISION,
            });
        }
        if reflection_share_bps > BPS_PRECISION {
            return Err(ConfigError::RateOutOfRange {
                name: "reflection_share_bps",
                value: reflection_share_bps,
                max: BPS_PRECISION,
            });
        }
        Ok(Self {
            fee_bps,
            reflection_share_bps,
        })
    }

    pub fn fee_bps(&self) -> u64 {
        self.fee_bps
    }

    pub fn reflection_share_bps(&self) -> u64 {
        self.reflection_share_bps
    }
}

/// `floor(value * bps / BPS_PRECISION)` without a wide intermediate.
///
/// Splits `value = q * P + r`, so the product is `q * bps + r * bps / P`.
/// Requires `bps <= BPS_PRECISION`, which keeps the result `<= value`.
fn apply_bps(value: Amount, bps: u64) -> Amount {
    let p = BPS_PRECISION as u128;
    let bps = bps as u128;
    (value / p) * bps + (value % p) * bps / p
}

impl FeeCalculator for FeePolicy {
    fn compute(&self, amount: Amount) -> Result<FeeBreakdown, LedgerError> {
        let fee = apply_bps(amount, self.fee_bps);
        let reflection_fee = apply_bps(fee, self.reflection_share_bps);
        let staking_fee = fee
            .checked_sub(reflection_fee)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let net = amount
            .checked_sub(fee)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        Ok(FeeBreakdown {
            amount,
            net,
            reflection_fee,
            staking_fee,
        })
    }
}
