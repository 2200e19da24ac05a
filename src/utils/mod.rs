//! Utility functions for formatting and parsing
//!
//! Centralized formatting of fiat amounts and quantities for table output,
//! plus the date formats accepted in input files and on the command line.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "$" prefix (US Dollar)
    Usd,
    /// No currency symbol (for table cells)
    None,
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using US conventions (`,` thousands separator,
/// `.` decimal separator), rounded half-even to `places` decimal places.
///
/// # Examples
/// ```
/// use ethbasis::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, 2, CurrencySymbol::Usd),
///     "$1,234.56"
/// );
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, 2, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_currency_with_width(
    value: Decimal,
    width: usize,
    places: u32,
    symbol: CurrencySymbol,
) -> String {
    let rounded = value.round_dp(places);
    let is_negative = rounded < Decimal::ZERO;
    let formatted = format!("{:.*}", places as usize, rounded.abs());

    let (integer_part, fraction_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let with_separators = group_thousands(integer_part);

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Usd => "$",
        CurrencySymbol::None => "",
    };

    let result = match fraction_part {
        Some(frac) => format!("{}{}{}.{}", sign, prefix, with_separators, frac),
        None => format!("{}{}{}", sign, prefix, with_separators),
    };

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a quantity without rounding, dropping trailing zeros
///
/// # Examples
/// ```
/// use ethbasis::utils::format_quantity;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_quantity(dec!(1.50000)), "1.5");
/// assert_eq!(format_quantity(dec!(12)), "12");
/// ```
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Parse a calendar day given as `YYYY-MM-DD`, `MM/DD/YYYY` or `MM-DD-YYYY`
pub fn parse_flexible_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }
    Err(anyhow!(
        "Invalid date '{}'. Use YYYY-MM-DD, MM/DD/YYYY or MM-DD-YYYY",
        s
    ))
}

/// Parse the `dd-mm-yyyy` day keys used by the reward cache
pub fn parse_cache_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d-%m-%Y")
        .map_err(|e| anyhow!("Invalid reward cache date '{}': {}", s, e))
}
