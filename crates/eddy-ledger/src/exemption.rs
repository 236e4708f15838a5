//! Administrative fee-exemption list.

use std::collections::HashSet;

use eddy_core::traits::FeeExemption;
use eddy_core::types::AccountId;
use parking_lot::RwLock;
use tracing::info;

/// Set of accounts that send without paying transfer fees.
///
/// Interior-mutable so an administrator can update it while the ledger
/// holds a shared reference.
#[derive(Debug, Default)]
pub struct ExemptionList {
    exempt: RwLock<HashSet<AccountId>>,
}

impl ExemptionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            exempt: RwLock::new(accounts.into_iter().collect()),
        }
    }

    /// Mark or unmark `account` as exempt. Returns whether anything changed.
    pub fn set_fee_exempt(&self, account: AccountId, exempt: bool) -> bool {
        let mut set = self.exempt.write();
        let changed = if exempt {
            set.insert(account)
        } else {
            set.remove(&account)
        };
        if changed {
            info!(%account, exempt, "fee exemption changed");
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.exempt.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.exempt.read().is_empty()
    }
}

impl FeeExemption for ExemptionList {
    fn is_fee_exempt(&self, account: &AccountId) -> bool {
        self.exempt.read().contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear() {
        let list = ExemptionList::new();
        let a = AccountId::from_label("a");
        assert!(!list.is_fee_exempt(&a));
        assert!(list.set_fee_exempt(a, true));
        assert!(!list.set_fee_exempt(a, true));
        assert!(list.is_fee_exempt(&a));
        assert!(list.set_fee_exempt(a, false));
        assert!(!list.is_fee_exempt(&a));
        assert!(list.is_empty());
    }

    #[test]
    fn seeded_accounts() {
        let owner = AccountId::from_label("owner");
        let list = ExemptionList::with_accounts([owner]);
        assert!(list.is_fee_exempt(&owner));
        assert_eq!(list.len(), 1);
    }
}
