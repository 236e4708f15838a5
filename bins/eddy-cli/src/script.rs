//! Scripted simulations.
//!
//! A script is a JSON document listing ledger operations by account label:
//!
//! ```json
//! { "steps": [
//!     { "op": "transfer", "from": "owner", "to": "alice", "amount": "100" },
//!     { "op": "stake", "who": "alice", "amount": "50", "days": 14 },
//!     { "op": "advance", "days": 14 },
//!     { "op": "claim", "who": "alice" }
//! ] }
//! ```
//!
//! Labels hash to account ids; `owner` is the genesis owner. A failing step
//! is recorded in the report and the run continues, the way a reverted
//! transaction leaves the chain going.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use eddy_core::clock::ManualClock;
use eddy_core::event::LedgerEvent;
use eddy_core::traits::LedgerObserver;
use eddy_core::types::{AccountId, Amount};
use eddy_core::units::{format_tokens, parse_tokens};
use eddy_ledger::{ExemptionList, Ledger, LedgerConfig, SharedLedger};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Label of the genesis owner.
pub const OWNER_LABEL: &str = "owner";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Transfer {
        from: String,
        to: String,
        amount: String,
    },
    Approve {
        owner: String,
        spender: String,
        amount: String,
    },
    TransferFrom {
        spender: String,
        from: String,
        to: String,
        amount: String,
    },
    Stake {
        who: String,
        amount: String,
        days: u64,
    },
    Claim {
        who: String,
    },
    Advance {
        days: u64,
    },
    Exempt {
        who: String,
        #[serde(default = "default_true")]
        exempt: bool,
    },
}

fn default_true() -> bool {
    true
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Transfer { .. } => "transfer",
            Step::Approve { .. } => "approve",
            Step::TransferFrom { .. } => "transfer_from",
            Step::Stake { .. } => "stake",
            Step::Claim { .. } => "claim",
            Step::Advance { .. } => "advance",
            Step::Exempt { .. } => "exempt",
        }
    }

    fn labels(&self) -> Vec<&str> {
        match self {
            Step::Transfer { from, to, .. } => vec![from.as_str(), to.as_str()],
            Step::Approve { owner, spender, .. } => vec![owner.as_str(), spender.as_str()],
            Step::TransferFrom {
                spender, from, to, ..
            } => vec![spender.as_str(), from.as_str(), to.as_str()],
            Step::Stake { who, .. } | Step::Claim { who } | Step::Exempt { who, .. } => {
                vec![who.as_str()]
            }
            Step::Advance { .. } => vec![],
        }
    }
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid simulation script")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    /// `None` on success.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub label: String,
    pub account: String,
    pub balance: String,
    pub staked: String,
    pub last_reward: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub steps: Vec<StepOutcome>,
    pub accounts: Vec<AccountReport>,
    pub total_supply: String,
    pub stake_total_share: String,
    pub stake_total_reward: String,
    pub events: usize,
}

impl Report {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| s.error.is_some()).count()
    }
}

/// Observer counting delivered events.
#[derive(Default)]
struct EventCounter(AtomicUsize);

impl EventCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl LedgerObserver for EventCounter {
    fn on_event(&self, event: &LedgerEvent) {
        debug!(?event, "ledger event");
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A fresh ledger plus the administrative handles a script drives.
pub struct Simulation {
    ledger: SharedLedger,
    clock: ManualClock,
    exemption: Arc<ExemptionList>,
    events: Arc<EventCounter>,
}

impl Simulation {
    pub fn new(config: &LedgerConfig, start_time: u64) -> Result<Self> {
        let owner = AccountId::from_label(OWNER_LABEL);
        let clock = ManualClock::new(start_time);
        let exemption = Arc::new(ExemptionList::with_accounts([owner]));
        let ledger = Ledger::new(
            config.genesis(owner),
            config.fee_policy()?,
            exemption.clone(),
            Arc::new(clock.clone()),
        )?;
        let ledger = SharedLedger::new(ledger);
        let events = Arc::new(EventCounter::default());
        ledger.subscribe(events.clone());
        Ok(Self {
            ledger,
            clock,
            exemption,
            events,
        })
    }

    pub fn run(&self, script: &Script) -> Report {
        let mut labels = BTreeSet::from([OWNER_LABEL.to_string()]);
        let mut steps = Vec::with_capacity(script.steps.len());

        for (index, step) in script.steps.iter().enumerate() {
            labels.extend(step.labels().into_iter().map(str::to_string));
            let error = self.apply(step).err().map(|e| format!("{e:#}"));
            if let Some(err) = &error {
                warn!(index, op = step.name(), %err, "step failed");
            }
            steps.push(StepOutcome {
                index,
                op: step.name(),
                error,
            });
        }

        self.ledger.read(|ledger| Report {
            steps,
            accounts: labels
                .into_iter()
                .map(|label| {
                    let id = AccountId::from_label(&label);
                    AccountReport {
                        account: id.to_string(),
                        balance: format_tokens(ledger.balance_of(&id)),
                        staked: format_tokens(ledger.stake_of(&id).map_or(0, |s| s.principal)),
                        last_reward: format_tokens(ledger.account_stake_reward(&id)),
                        label,
                    }
                })
                .collect(),
            total_supply: format_tokens(ledger.total_supply()),
            stake_total_share: format_tokens(ledger.stake_total_share()),
            stake_total_reward: format_tokens(ledger.stake_total_reward()),
            events: self.events.count(),
        })
    }

    fn apply(&self, step: &Step) -> Result<()> {
        match step {
            Step::Transfer { from, to, amount } => {
                self.ledger.transfer(id(from), id(to), tokens(amount)?)?;
            }
            Step::Approve {
                owner,
                spender,
                amount,
            } => {
                self.ledger.approve(id(owner), id(spender), tokens(amount)?)?;
            }
            Step::TransferFrom {
                spender,
                from,
                to,
                amount,
            } => {
                self.ledger
                    .transfer_from(id(spender), id(from), id(to), tokens(amount)?)?;
            }
            Step::Stake { who, amount, days } => {
                self.ledger.stake_token(id(who), tokens(amount)?, *days)?;
            }
            Step::Claim { who } => {
                self.ledger.claim_reward(id(who))?;
            }
            Step::Advance { days } => self.clock.advance_days(*days),
            Step::Exempt { who, exempt } => {
                self.exemption.set_fee_exempt(id(who), *exempt);
            }
        }
        Ok(())
    }
}

fn id(label: &str) -> AccountId {
    AccountId::from_label(label)
}

fn tokens(amount: &str) -> Result<Amount> {
    parse_tokens(amount).with_context(|| format!("invalid amount {amount:?}"))
}
