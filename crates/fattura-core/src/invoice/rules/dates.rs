//! Strict date parsing for FatturaPA fields.

use chrono::NaiveDate;

use super::patterns::ISO_DATE;

/// Parse a `YYYY-MM-DD` date.
///
/// No other layout is accepted: `01/02/2024` is rejected rather than guessed.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, &'static str> {
    let s = s.trim();
    if !ISO_DATE.is_match(s) {
        return Err("expected YYYY-MM-DD");
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| "not a valid calendar date")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2024-03-15"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert_eq!(
            parse_iso_date(" 2024-03-15\n"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
    }

    #[test]
    fn test_rejects_other_layouts() {
        assert_eq!(parse_iso_date("15.03.2024"), Err("expected YYYY-MM-DD"));
        assert_eq!(parse_iso_date("2024-3-15"), Err("expected YYYY-MM-DD"));
        assert_eq!(parse_iso_date(""), Err("expected YYYY-MM-DD"));
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert_eq!(parse_iso_date("2023-02-29"), Err("not a valid calendar date"));
        assert_eq!(parse_iso_date("2024-13-01"), Err("not a valid calendar date"));
        assert!(parse_iso_date("2024-02-29").is_ok());
    }
}
