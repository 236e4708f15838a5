//! Token constants. All monetary values in wei (1 EDDY = 10^18 wei).

/// Number of decimal places exposed to holders.
pub const DECIMALS: u8 = 18;

/// One whole token in wei.
pub const COIN: u128 = 1_000_000_000_000_000_000;

/// Fixed real total supply minted to the genesis owner (10,000,000 EDDY).
pub const TOTAL_SUPPLY: u128 = 10_000_000 * COIN;

pub const TOKEN_NAME: &str = "Eddy";
pub const TOKEN_SYMBOL: &str = "EDDY";

/// Basis-point denominator for fee rates.
pub const BPS_PRECISION: u64 = 10_000;

/// Fee charged on every non-exempt transfer: 10%.
pub const TRANSFER_FEE_BPS: u64 = 1_000;

/// Share of the transfer fee that is reflected to holders: 50%.
///
/// The remainder (including any odd wei) accrues to the staking pool.
pub const REFLECTION_SHARE_BPS: u64 = 5_000;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Short lock period in days and its share weight.
pub const SHORT_LOCK_DAYS: u64 = 14;
pub const SHORT_LOCK_WEIGHT: u128 = 3;

/// Long lock period in days and its share weight.
pub const LONG_LOCK_DAYS: u64 = 30;
pub const LONG_LOCK_WEIGHT: u128 = 7;
