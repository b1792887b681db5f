//! Rational number parsing for segment boundaries.
//!
//! Accepts the notations operators actually type into configs:
//! `1/3`, `1`, `0.25` and `25%`.

use num_rational::Ratio;
use num_traits::{One, Zero};

use crate::error::{SegmentError, SegmentResult};

/// Exact rational used for every segment boundary.
pub type Rational = Ratio<i64>;

/// Most fractional digits a decimal boundary may carry (10^18 fits in i64).
const MAX_DECIMAL_DIGITS: u32 = 18;

/// Parse a non-negative rational from text.
pub fn parse_rational(input: &str) -> SegmentResult<Rational> {
    let text = input.trim();
    let invalid = || SegmentError::InvalidNumber(input.to_string());

    if text.is_empty() {
        return Err(invalid());
    }

    if let Some(percent) = text.strip_suffix('%') {
        let value = parse_rational(percent).map_err(|_| invalid())?;
        return Ok(value / Rational::from_integer(100));
    }

    if let Some((numer, denom)) = text.split_once('/') {
        let numer = parse_digits(numer).ok_or_else(invalid)?;
        let denom = parse_digits(denom).ok_or_else(invalid)?;
        if denom == 0 {
            return Err(invalid());
        }
        return Ok(Rational::new(numer, denom));
    }

    if let Some((whole, fraction)) = text.split_once('.') {
        let digits = fraction.len() as u32;
        if digits == 0 || digits > MAX_DECIMAL_DIGITS {
            return Err(invalid());
        }
        let whole = if whole.is_empty() {
            0
        } else {
            parse_digits(whole).ok_or_else(invalid)?
        };
        let fraction = parse_digits(fraction).ok_or_else(invalid)?;
        let scale = 10i64.pow(digits);
        let numer = whole
            .checked_mul(scale)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(invalid)?;
        return Ok(Rational::new(numer, scale));
    }

    parse_digits(text)
        .map(Rational::from_integer)
        .ok_or_else(invalid)
}

/// Check that a value lies inside `[0, 1]`.
pub(crate) fn check_unit(value: Rational) -> SegmentResult<Rational> {
    if value < Rational::zero() || value > Rational::one() {
        return Err(SegmentError::OutOfRange(value.to_string()));
    }
    Ok(value)
}

fn parse_digits(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractions() {
        assert_eq!(parse_rational("1/3").unwrap(), Rational::new(1, 3));
        assert_eq!(parse_rational(" 2/4 ").unwrap(), Rational::new(1, 2));
    }

    #[test]
    fn parses_integers_and_decimals() {
        assert_eq!(parse_rational("0").unwrap(), Rational::zero());
        assert_eq!(parse_rational("1").unwrap(), Rational::one());
        assert_eq!(parse_rational("0.25").unwrap(), Rational::new(1, 4));
        assert_eq!(parse_rational(".5").unwrap(), Rational::new(1, 2));
    }

    #[test]
    fn parses_percentages() {
        assert_eq!(parse_rational("25%").unwrap(), Rational::new(1, 4));
        assert_eq!(parse_rational("12.5%").unwrap(), Rational::new(1, 8));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "abc", "1/0", "-1/2", "1.", "1/2/3", "%", "0x10"] {
            assert!(parse_rational(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn unit_range_is_enforced() {
        assert!(check_unit(Rational::new(3, 2)).is_err());
        assert!(check_unit(Rational::one()).is_ok());
        assert!(check_unit(Rational::zero()).is_ok());
    }
}
