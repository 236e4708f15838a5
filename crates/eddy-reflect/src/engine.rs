//! Redistribution engine.
//!
//! Redistribution is a single subtraction from the reflected total supply.
//! Every holder's real balance is derived from the shared rate, so shrinking
//! the denominator raises all of them proportionally at once.

use eddy_core::error::LedgerError;
use eddy_core::types::Reflected;
use tracing::trace;

/// Applies the reflection half of transfer fees.
#[derive(Debug, Clone, Default)]
pub struct RedistributionEngine;

impl RedistributionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Reflected supply after redistributing `reflected_fee`.
    ///
    /// Pure: the caller commits the returned value once every other check
    /// of the operation has passed.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RateUnderflow`] if the supply would reach zero or below.
    pub fn apply_redistribution(
        &self,
        reflected_supply: Reflected,
        reflected_fee: Reflected,
    ) -> Result<Reflected, LedgerError> {
        let remaining = reflected_supply
            .checked_sub(reflected_fee)
            .filter(|r| !r.is_zero())
            .ok_or(LedgerError::RateUnderflow)?;
        trace!(%reflected_fee, %remaining, "redistributed reflection fee");
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::Rate;
    use eddy_core::constants::{COIN, TOTAL_SUPPLY};
    use eddy_core::genesis::initial_reflected_supply;
    use eddy_core::types::U256;

    fn engine() -> RedistributionEngine {
        RedistributionEngine::new()
    }

    #[test]
    fn subtracts_fee() {
        let supply = U256::from(1_000u64);
        let out = engine().apply_redistribution(supply, U256::from(10u64)).unwrap();
        assert_eq!(out, U256::from(990u64));
    }

    #[test]
    fn zero_fee_is_noop() {
        let supply = U256::from(1_000u64);
        assert_eq!(engine().apply_redistribution(supply, U256::zero()).unwrap(), supply);
    }

    #[test]
    fn draining_supply_underflows() {
        let supply = U256::from(1_000u64);
        assert_eq!(
            engine().apply_redistribution(supply, supply),
            Err(LedgerError::RateUnderflow)
        );
        assert_eq!(
            engine().apply_redistribution(supply, supply + U256::one()),
            Err(LedgerError::RateUnderflow)
        );
    }

    #[test]
    fn holders_gain_in_proportion() {
        // Two holders with 100 and 200 tokens; 5 tokens reflected.
        let reflected = initial_reflected_supply(TOTAL_SUPPLY);
        let before = Rate::new(reflected, TOTAL_SUPPLY).unwrap();
        let small = before.to_reflected(100 * COIN).unwrap();
        let large = before.to_reflected(200 * COIN).unwrap();
        let fee = before.to_reflected(5 * COIN).unwrap();

        let after_supply = engine().apply_redistribution(reflected, fee).unwrap();
        let after = Rate::new(after_supply, TOTAL_SUPPLY).unwrap();

        let gain_small = after.to_real(small) - 100 * COIN;
        let gain_large = after.to_real(large) - 200 * COIN;
        assert!(gain_small > 0);
        assert!(gain_large.abs_diff(gain_small * 2) <= 1);
        assert!(after.is_at_least(&before));
    }
}
