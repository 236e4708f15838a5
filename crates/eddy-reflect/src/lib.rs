//! # eddy-reflect: reflection arithmetic for the Eddy ledger.
//!
//! All calculations use integer arithmetic only, with 512-bit intermediates
//! for reflected/real conversion.
//!
//! Balances are stored in *reflected* units against a single shrinking
//! denominator:
//! - **Rate**: one snapshot of `(reflected, real)` circulating supply,
//!   converting between the two unit systems with floor rounding.
//! - **Fee policy**: fixed-rate transfer fee split between reflection and
//!   the staking pool.
//! - **Redistribution**: shrinking the reflected supply raises every
//!   holder's derived real balance in O(1), with no per-holder update.

pub mod engine;
pub mod fee;
pub mod rate;

pub use engine::RedistributionEngine;
pub use fee::FeePolicy;
pub use rate::Rate;
