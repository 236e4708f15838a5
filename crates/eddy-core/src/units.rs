//! Decimal token amount parsing and formatting.
//!
//! Amounts are exact: `"90.000045"` with 18 decimals is
//! `90_000_045_000_000_000_000` wei. No floating point is involved.

use crate::constants::DECIMALS;
use crate::error::UnitsError;
use crate::types::Amount;

/// Parse a decimal string into base units with `decimals` fractional digits.
///
/// # Examples
///
/// ```
/// use eddy_core::units::parse_units;
/// assert_eq!(parse_units("1.5", 2).unwrap(), 150);
/// assert_eq!(parse_units("100", 0).unwrap(), 100);
/// ```
pub fn parse_units(s: &str, decimals: u8) -> Result<Amount, UnitsError> {
    let s = s.trim().replace('_', "");
    if s.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s.as_str(), ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::Empty);
    }
    if let Some(c) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(UnitsError::InvalidCharacter(c));
    }
    if frac.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals {
            got: frac.len(),
            max: decimals,
        });
    }

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or(UnitsError::Overflow)?;
    let whole_val = digits_to_u128(whole)?
        .checked_mul(scale)
        .ok_or(UnitsError::Overflow)?;

    let frac_scale = 10u128.pow((decimals as usize - frac.len()) as u32);
    let frac_val = digits_to_u128(frac)?
        .checked_mul(frac_scale)
        .ok_or(UnitsError::Overflow)?;

    whole_val.checked_add(frac_val).ok_or(UnitsError::Overflow)
}

/// Parse a token amount with the ledger's 18 decimals.
pub fn parse_tokens(s: &str) -> Result<Amount, UnitsError> {
    parse_units(s, DECIMALS)
}

/// Format base units as a decimal string, trimming trailing zeros.
///
/// # Examples
///
/// ```
/// use eddy_core::units::format_units;
/// assert_eq!(format_units(150, 2), "1.5");
/// assert_eq!(format_units(100, 2), "1");
/// ```
pub fn format_units(value: Amount, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}", width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Format wei as whole tokens with 18 decimals.
pub fn format_tokens(value: Amount) -> String {
    format_units(value, DECIMALS)
}

fn digits_to_u128(digits: &str) -> Result<u128, UnitsError> {
    digits.chars().try_fold(0u128, |acc, c| {
        let d = c.to_digit(10).ok_or(UnitsError::InvalidCharacter(c))? as u128;
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(d))
            .ok_or(UnitsError::Overflow)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COIN;
    use proptest::prelude::*;

    #[test]
    fn parse_whole_tokens() {
        assert_eq!(parse_tokens("100").unwrap(), 100 * COIN);
        assert_eq!(parse_tokens("10_000_000").unwrap(), 10_000_000 * COIN);
    }

    #[test]
    fn parse_fractional_tokens() {
        assert_eq!(parse_tokens("90.000045").unwrap(), 90_000_045_000_000_000_000);
        assert_eq!(parse_tokens("0.5").unwrap(), COIN / 2);
        assert_eq!(parse_tokens(".5").unwrap(), COIN / 2);
        assert_eq!(parse_tokens("5.").unwrap(), 5 * COIN);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_tokens(""), Err(UnitsError::Empty));
        assert_eq!(parse_tokens("."), Err(UnitsError::Empty));
        assert_eq!(parse_tokens("-1"), Err(UnitsError::InvalidCharacter('-')));
        assert_eq!(parse_tokens("1e5"), Err(UnitsError::InvalidCharacter('e')));
        assert_eq!(parse_tokens("1.2.3"), Err(UnitsError::InvalidCharacter('.')));
        assert_eq!(
            parse_tokens("0.0000000000000000001"),
            Err(UnitsError::TooManyDecimals { got: 19, max: 18 })
        );
    }

    #[test]
    fn parse_overflow() {
        assert_eq!(parse_tokens("1000000000000000000000"), Err(UnitsError::Overflow));
    }

    #[test]
    fn format_trims_zeros() {
        assert_eq!(format_tokens(0), "0");
        assert_eq!(format_tokens(5 * COIN), "5");
        assert_eq!(format_tokens(90_000_045_000_045_000_045), "90.000045000045000045");
        assert_eq!(format_tokens(1), "0.000000000000000001");
    }

    proptest! {
        #[test]
        fn format_then_parse_is_identity(v in 0u128..=u128::MAX / 10) {
            let s = format_tokens(v);
            prop_assert_eq!(parse_tokens(&s).unwrap(), v);
        }
    }
}
