//! Amount type for handling monetary values read from, and written to, the spreadsheet.
//!
//! Values in the sheet are typed by people, so they arrive in several shapes: `1500`, `1500.5`,
//! `1.500,50`, `R$ 1.500,50` or `$1,500.50`. `Amount` parses all of these into a `Decimal` and
//! always displays itself using the Brazilian Real convention, e.g. `R$ 1.500,50`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Add, Sub};
use std::str::FromStr;

/// The currency symbol printed in front of every displayed amount.
const CURRENCY: &str = "R$";

/// Represents a money amount.
///
/// Equality and ordering are numeric. Formatting is a presentation concern only: the underlying
/// `Decimal` is never rounded or altered by `Display`.
///
/// # Examples
///
/// ```
/// # use site_ledger::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("R$ 1.234,56").unwrap();
/// let b = Amount::from_str("1,234.56").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "R$ 1.234,56");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds half away from zero to two decimal places.
    pub fn round_cents(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// The value as a floating point number, for transmission to the spreadsheet.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(String);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Remove the currency symbols and all whitespace, e.g. "R$ -1.200,00" -> "-1.200,00"
        let compact: String = s
            .replace(CURRENCY, "")
            .replace('$', "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if compact.is_empty() {
            return Err(AmountError(format!("'{s}' is not an amount")));
        }

        let normalized = normalize_separators(&compact);
        Decimal::from_str(&normalized)
            .map(Amount)
            .map_err(|e| AmountError(format!("'{s}' is not an amount: {e}")))
    }
}

/// Rewrites a number so that `.` is the only (decimal) separator.
///
/// When both separators are present, whichever comes last is the decimal separator. A lone comma
/// is a decimal separator, repeated commas are thousands separators. The same goes for dots.
fn normalize_separators(s: &str) -> String {
    let commas = s.matches(',').count();
    let dots = s.matches('.').count();
    match (commas, dots) {
        (0, 0) | (0, 1) => s.to_string(),
        (0, _) => s.replace('.', ""),
        (1, 0) => s.replace(',', "."),
        (_, 0) => s.replace(',', ""),
        _ => {
            let last_comma = s.rfind(',').unwrap_or_default();
            let last_dot = s.rfind('.').unwrap_or_default();
            if last_comma > last_dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.abs().to_f64().unwrap_or_default();
        // format_num renders "1,234.56", swap the separators to get "1.234,56"
        let us = format_num::format_num!(",.2", abs);
        let br: String = us
            .chars()
            .map(|c| match c {
                ',' => '.',
                '.' => ',',
                other => other,
            })
            .collect();
        write!(f, "{CURRENCY} {sign}{br}")
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}
