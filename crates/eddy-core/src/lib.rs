//! # eddy-core
//! Foundation types and traits for the Eddy token ledger.

pub mod clock;
pub mod constants;
pub mod error;
pub mod event;
pub mod genesis;
pub mod traits;
pub mod types;
pub mod units;
