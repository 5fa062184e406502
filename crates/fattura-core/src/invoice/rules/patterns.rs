//! Regex patterns for FatturaPA value formats.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // xs:date as used by FatturaPA, without time zone
    pub static ref ISO_DATE: Regex = Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$"
    ).unwrap();

    // Plain decimal, dot separator, optional sign; no exponent or grouping
    pub static ref DECIMAL_AMOUNT: Regex = Regex::new(
        r"^[+-]?[0-9]+(?:\.[0-9]+)?$"
    ).unwrap();
}
