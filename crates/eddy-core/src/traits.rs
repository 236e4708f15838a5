//! Trait interfaces for the Eddy ledger.
//!
//! These traits define the seams between the ledger core and its
//! collaborators:
//! - [`TimeSource`]: wall clock used to enforce lock periods
//! - [`FeeExemption`]: authorization source for fee-exempt accounts
//! - [`FeeCalculator`]: fee split computation (eddy-reflect implements)
//! - [`LedgerObserver`]: post-commit event sink

use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::types::{AccountId, Amount, FeeBreakdown};

/// Source of wall-clock time in Unix seconds.
///
/// Treated as untrusted input: successive readings are only assumed to be
/// non-decreasing across real time, never strictly increasing.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> u64;
}

/// Predicate deciding which senders pay no transfer fee.
///
/// Owned by an administrative authority; the ledger core only reads it.
pub trait FeeExemption: Send + Sync {
    fn is_fee_exempt(&self, account: &AccountId) -> bool;
}

/// Pure computation of the fee charged on a transfer.
pub trait FeeCalculator: Send + Sync {
    /// Split `amount` into net, reflection and staking components.
    fn compute(&self, amount: Amount) -> Result<FeeBreakdown, LedgerError>;

    /// Fee breakdown for a sender, honouring exemption.
    ///
    /// Default implementation returns [`FeeBreakdown::exempt`] for exempt
    /// senders and delegates to [`compute`](Self::compute) otherwise.
    fn compute_for(
        &self,
        exemption: &dyn FeeExemption,
        sender: &AccountId,
        amount: Amount,
    ) -> Result<FeeBreakdown, LedgerError> {
        if exemption.is_fee_exempt(sender) {
            return Ok(FeeBreakdown::exempt(amount));
        }
        self.compute(amount)
    }
}

/// Receives ledger events strictly after the producing operation has
/// committed all of its state changes.
pub trait LedgerObserver: Send + Sync {
    fn on_event(&self, event: &LedgerEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FixedExemption(HashSet<AccountId>);

    impl FeeExemption for FixedExemption {
        fn is_fee_exempt(&self, account: &AccountId) -> bool {
            self.0.contains(account)
        }
    }

    struct FlatTenth;

    impl FeeCalculator for FlatTenth {
        fn compute(&self, amount: Amount) -> Result<FeeBreakdown, LedgerError> {
            let fee = amount / 10;
            Ok(FeeBreakdown {
                amount,
                net: amount - fee,
                reflection_fee: fee / 2,
                staking_fee: fee - fee / 2,
            })
        }
    }

    #[test]
    fn compute_for_skips_exempt_senders() {
        let owner = AccountId::from_label("owner");
        let user = AccountId::from_label("user");
        let exemption = FixedExemption([owner].into_iter().collect());

        let exempt = FlatTenth.compute_for(&exemption, &owner, 100).unwrap();
        assert_eq!(exempt, FeeBreakdown::exempt(100));

        let taxed = FlatTenth.compute_for(&exemption, &user, 100).unwrap();
        assert_eq!(taxed.fee(), 10);
        assert_eq!(taxed.net, 90);
    }
}
