//! Error types for the Eddy ledger.
//!
//! Messages on the transfer/stake/claim paths are kept verbatim for
//! compatibility with existing clients that match on them.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ERC20: transfer to the zero address")] InvalidRecipient,
    #[error("Insufficient balance to transfer")] InsufficientBalance,
    #[error("Insufficient balance to stake")] InsufficientBalanceToStake,
    #[error("You are not stake any token")] NotStaked,
    #[error("Too early to claim reward")] TooEarly,
    #[error("invalid lock period: {0} days")] InvalidPeriod(u64),
    #[error("account already has an active stake")] AlreadyStaked,
    #[error("stake amount must be non-zero")] ZeroStake,
    #[error("reflected supply underflow")] RateUnderflow,
    #[error("ERC20: approve to the zero address")] InvalidSpender,
    #[error("ERC20: insufficient allowance")] InsufficientAllowance,
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("total supply must be non-zero")] ZeroSupply,
    #[error("genesis owner must not be the zero address")] NullOwner,
    #[error("{name} out of range: {value} > {max}")] RateOutOfRange { name: &'static str, value: u64, max: u64 },
    #[error("load: {0}")] Load(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("empty amount")] Empty,
    #[error("invalid character in amount: {0}")] InvalidCharacter(char),
    #[error("too many decimal places: {got} > {max}")] TooManyDecimals { got: usize, max: u8 },
    #[error("amount overflows u128")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: expected 32 bytes, got {0}")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("reflected units unbalanced: accounts {accounts} + custody {custody} != supply {supply}")] ReflectedMismatch { accounts: String, custody: String, supply: String },
    #[error("share total {recorded} != sum of active stakes {actual}")] SharesMismatch { recorded: u128, actual: u128 },
    #[error("principal total {recorded} != sum of active stakes {actual}")] PrincipalMismatch { recorded: u128, actual: u128 },
    #[error("stake of {owner} records {recorded} shares, expected {expected}")] StakeSharesMismatch { owner: String, recorded: u128, expected: String },
    #[error("stake of {owner} has zero principal")] EmptyStake { owner: String },
    #[error("custody {custody} exceeds real supply {supply}")] CustodyExceedsSupply { custody: u128, supply: u128 },
    #[error("zero supply")] ZeroSupply,
}

#[derive(Error, Debug)]
pub enum EddyError {
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Invariant(#[from] InvariantViolation),
    #[error(transparent)] Units(#[from] UnitsError),
    #[error(transparent)] AccountId(#[from] AccountIdError),
}
