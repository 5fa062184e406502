//! Amount parsing and formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::DECIMAL_AMOUNT;

/// Parse a non-negative decimal amount such as `250.50`.
pub fn parse_amount(s: &str) -> Result<Decimal, &'static str> {
    let s = s.trim();
    if !DECIMAL_AMOUNT.is_match(s) {
        return Err("not a decimal number");
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let mut amount = Decimal::from_str(s).map_err(|_| "amount out of range")?;
    if amount.is_sign_negative() {
        if !amount.is_zero() {
            return Err("amount is negative");
        }
        amount.set_sign_positive(true);
    }

    Ok(amount)
}

/// Format an amount with exactly two decimals (`350.5` -> `350.50`).
///
/// Midpoints round away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("250.50"), Ok(dec("250.50")));
        assert_eq!(parse_amount("100"), Ok(dec("100")));
        assert_eq!(parse_amount(" 0.10 "), Ok(dec("0.10")));
        assert_eq!(parse_amount("+7.5"), Ok(dec("7.5")));
    }

    #[test]
    fn test_parse_amount_rejects_bad_text() {
        assert_eq!(parse_amount("abc"), Err("not a decimal number"));
        assert_eq!(parse_amount("1.234,56"), Err("not a decimal number"));
        assert_eq!(parse_amount("inf"), Err("not a decimal number"));
        assert_eq!(parse_amount("١٠٠"), Err("not a decimal number"));
        assert_eq!(parse_amount("-0.01"), Err("amount is negative"));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let amount = parse_amount("-0.00").unwrap();
        assert!(amount.is_zero());
        assert!(!amount.is_sign_negative());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("350.5")), "350.50");
        assert_eq!(format_amount(dec("1234")), "1234.00");
        assert_eq!(format_amount(dec("0.125")), "0.13");
        assert_eq!(format_amount(dec("10.004")), "10.00");
    }
}
