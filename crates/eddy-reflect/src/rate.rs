//! Exchange rate between reflected and real units.
//!
//! A [`Rate`] is an immutable snapshot. An operation takes one snapshot on
//! entry and performs every conversion against it, so the rate cannot move
//! mid-operation even though it moves between operations.

use eddy_core::error::LedgerError;
use eddy_core::types::{Amount, Reflected, U256, U512};

/// Circulating supply snapshot: `reflected` units back `real` wei.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rate {
    reflected: Reflected,
    real: Amount,
}

impl Rate {
    /// Create a rate from a circulating reflected/real pair.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RateUnderflow`] if either side is zero.
    pub fn new(reflected: Reflected, real: Amount) -> Result<Self, LedgerError> {
        if reflected.is_zero() || real == 0 {
            return Err(LedgerError::RateUnderflow);
        }
        Ok(Self { reflected, real })
    }

    /// Circulating rate with the staking custody excluded.
    ///
    /// Custody (locked principal and undistributed pool) neither earns nor
    /// dilutes reflection, so it is removed from both sides. When custody
    /// covers the whole supply on either side the full supplies are used.
    pub fn circulating(
        reflected_total: Reflected,
        real_total: Amount,
        custody_reflected: Reflected,
        custody_real: Amount,
    ) -> Result<Self, LedgerError> {
        if custody_reflected < reflected_total && custody_real < real_total {
            Self::new(reflected_total - custody_reflected, real_total - custody_real)
        } else {
            Self::new(reflected_total, real_total)
        }
    }

    pub fn reflected(&self) -> Reflected {
        self.reflected
    }

    pub fn real(&self) -> Amount {
        self.real
    }

    /// Reflected units per real wei, rounded down. Display only.
    pub fn reflected_per_real(&self) -> Reflected {
        self.reflected / U256::from(self.real)
    }

    /// Convert real wei to reflected units, rounding toward zero.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ArithmeticOverflow`] if the result exceeds 256 bits,
    /// which only happens for amounts larger than the real supply.
    pub fn to_reflected(&self, real: Amount) -> Result<Reflected, LedgerError> {
        let wide = self.reflected.full_mul(U256::from(real)) / U512::from(self.real);
        Reflected::try_from(wide).map_err(|_| LedgerError::ArithmeticOverflow)
    }

    /// Convert reflected units to real wei, rounding toward zero.
    ///
    /// Saturates at `u128::MAX`; any reflected balance that exists in the
    /// ledger converts to at most the real supply.
    pub fn to_real(&self, reflected: Reflected) -> Amount {
        let wide = reflected.full_mul(U256::from(self.real)) / U512::from(self.reflected);
        match U256::try_from(wide) {
            Ok(v) if v <= U256::from(u128::MAX) => v.as_u128(),
            _ => u128::MAX,
        }
    }

    /// Whether `self` pays at least as many real wei per reflected unit as
    /// `earlier`. Rates only ever rise as reflected supply shrinks.
    pub fn is_at_least(&self, earlier: &Rate) -> bool {
        // real_a / refl_a >= real_b / refl_b  <=>  real_a * refl_b >= real_b * refl_a
        let lhs = earlier.reflected.full_mul(U256::from(self.real));
        let rhs = self.reflected.full_mul(U256::from(earlier.real));
        lhs >= rhs
    }
}
