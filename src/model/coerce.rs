//! Lenient per-field coercions applied to raw cell text. None of these fail: a value that cannot
//! be understood becomes "missing" (or `0` for week numbers).

use crate::model::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// The format dates are written in.
pub(crate) const ISO_DATE: &str = "%Y-%m-%d";

const DATE_FORMATS: &[&str] = &[ISO_DATE, "%d/%m/%Y"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a money cell. Empty or unparseable cells are `None`.
pub(crate) fn amount(cell: &str) -> Option<Amount> {
    Amount::from_str(cell).ok()
}

/// Parses a date cell. Empty or unparseable cells are `None`.
pub(crate) fn date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parses a week number cell. Unparseable or negative values become `0`, fractional values are
/// truncated toward zero.
pub(crate) fn week(cell: &str) -> u32 {
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<u32>() {
        return n;
    }
    Decimal::from_str(cell)
        .ok()
        .filter(|d| d.is_sign_positive())
        .and_then(|d| d.trunc().to_u32())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount() {
        assert_eq!(amount("500").unwrap().value(), Decimal::from(500));
        assert_eq!(amount("R$ 1.000,00").unwrap().value(), Decimal::from(1000));
        assert!(amount("").is_none());
        assert!(amount("n/a").is_none());
    }

    #[test]
    fn test_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(date("2025-03-17"), Some(expected));
        assert_eq!(date(" 2025-03-17 "), Some(expected));
        assert_eq!(date("17/03/2025"), Some(expected));
        assert_eq!(date("2025-03-17 08:30:00"), Some(expected));
        assert_eq!(date(""), None);
        assert_eq!(date("next tuesday"), None);
        assert_eq!(date("2025-02-30"), None);
    }

    #[test]
    fn test_week() {
        assert_eq!(week("3"), 3);
        assert_eq!(week(" 12 "), 12);
        assert_eq!(week("4.0"), 4);
        assert_eq!(week("4.9"), 4);
        assert_eq!(week(""), 0);
        assert_eq!(week("three"), 0);
        assert_eq!(week("-2"), 0);
    }
}
