//! Cross-crate test suite for the Eddy ledger.
//!
//! Integration tests live in `tests/`; shared fixtures in [`helpers`].

pub mod helpers;
