//! Property tests: ledger invariants under random operation sequences.
//!
//! Properties checked after every operation, successful or not:
//! - reflected units balance exactly (accounts + custody == supply)
//! - real value is conserved up to one wei of rounding per holder
//! - staking totals match the active stakes
//! - a failed operation changes nothing
//!
//! And over transfer-only sequences:
//! - the exchange rate never moves against holders

use eddy_core::constants::COIN;
use eddy_core::types::{AccountId, Amount};
use eddy_tests::helpers::*;
use proptest::prelude::*;

const ACTORS: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Clone, Debug)]
enum Op {
    /// Send `percent` of the sender's balance.
    Transfer { from: usize, to: usize, percent: u8 },
    Stake { who: usize, percent: u8, long: bool },
    Claim { who: usize },
    AdvanceDays(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..ACTORS.len(), 0..ACTORS.len(), 0u8..=100)
            .prop_map(|(from, to, percent)| Op::Transfer { from, to, percent }),
        2 => (0..ACTORS.len(), 0u8..=100, any::<bool>())
            .prop_map(|(who, percent, long)| Op::Stake { who, percent, long }),
        2 => (0..ACTORS.len()).prop_map(|who| Op::Claim { who }),
        1 => (0u8..=31).prop_map(Op::AdvanceDays),
    ]
}

fn funded(amounts: &[u64]) -> TestLedger {
    let mut t = TestLedger::new();
    for (label, amount) in ACTORS.iter().zip(amounts) {
        t.fund(label, *amount as Amount * COIN);
    }
    t
}

fn share(balance: Amount, percent: u8) -> Amount {
    balance / 100 * percent as Amount
}

fn apply(t: &mut TestLedger, op: &Op) -> bool {
    match *op {
        Op::Transfer { from, to, percent } => {
            let amount = share(t.balance(ACTORS[from]), percent);
            t.ledger
                .transfer(account(ACTORS[from]), account(ACTORS[to]), amount)
                .is_ok()
        }
        Op::Stake { who, percent, long } => {
            let amount = share(t.balance(ACTORS[who]), percent);
            let days = if long { 30 } else { 14 };
            t.ledger
                .stake_token(account(ACTORS[who]), amount, days)
                .is_ok()
        }
        Op::Claim { who } => t.ledger.claim_reward(account(ACTORS[who])).is_ok(),
        Op::AdvanceDays(days) => {
            t.clock.advance_days(days as u64);
            true
        }
    }
}

fn holders(t: &TestLedger) -> Vec<AccountId> {
    let mut all: Vec<_> = ACTORS.iter().map(|l| account(l)).collect();
    all.push(t.owner);
    all
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_under_random_operations(
        amounts in prop::collection::vec(1u64..1_000_000, ACTORS.len()),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut t = funded(&amounts);
        let supply = t.ledger.total_supply();

        for op in &ops {
            let before = t.ledger.snapshot();
            let ok = apply(&mut t, op);
            if !ok {
                prop_assert_eq!(&t.ledger.snapshot(), &before, "failed {:?} mutated state", op);
            }

            prop_assert!(t.ledger.check_invariants().is_ok(), "{:?}", t.ledger.check_invariants());
            prop_assert_eq!(t.ledger.total_supply(), supply);

            let circulating: Amount = holders(&t).iter().map(|a| t.ledger.balance_of(a)).sum();
            let accounted = circulating + t.ledger.total_staked() + t.ledger.stake_total_reward();
            prop_assert!(accounted <= supply, "created {} wei", accounted - supply);
            prop_assert!(
                supply - accounted <= holders(&t).len() as Amount,
                "lost {} wei",
                supply - accounted
            );
        }
    }

    #[test]
    fn transfers_never_lower_the_rate(
        amounts in prop::collection::vec(1u64..1_000_000, ACTORS.len()),
        hops in prop::collection::vec((0..ACTORS.len(), 0..ACTORS.len(), 1u64..1_000), 1..30),
    ) {
        let mut t = funded(&amounts);
        let mut rate = t.ledger.rate().unwrap();

        for (from, to, whole) in hops {
            let amount = whole as Amount * COIN;
            if t.ledger.transfer(account(ACTORS[from]), account(ACTORS[to]), amount).is_err() {
                continue;
            }
            let next = t.ledger.rate().unwrap();
            prop_assert!(next.is_at_least(&rate));
            rate = next;
        }
    }

    #[test]
    fn stake_then_claim_returns_principal(
        amount in 1u64..100_000,
        long in any::<bool>(),
    ) {
        let mut t = TestLedger::new();
        let who = t.fund("staker", amount as Amount * COIN);
        let days = if long { 30 } else { 14 };

        t.ledger.stake_token(who, amount as Amount * COIN, days).unwrap();
        prop_assert_eq!(t.ledger.balance_of(&who), 0);
        t.clock.advance_days(days);
        let receipt = t.ledger.claim_reward(who).unwrap();

        prop_assert_eq!(receipt.principal, amount as Amount * COIN);
        prop_assert_eq!(receipt.reward, 0);
        let back = t.ledger.balance_of(&who);
        prop_assert!(back.abs_diff(amount as Amount * COIN) <= 1, "got {}", back);
    }
}
