//! Fixed-point money value object.
//!
//! Balances and amounts are stored as a signed count of minor units (cents),
//! matching two decimal places on the wire. Arithmetic is checked; there is
//! no silent wrap-around on overflow.

use core::fmt;
use core::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LedgerError;

const MINOR_PER_UNIT: i64 = 100;

/// A monetary value with two decimal places of precision.
///
/// Serialized as a decimal string (`"40.00"`); deserialization additionally
/// accepts JSON numbers so the wire format of the original REST contract
/// keeps working.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from a count of minor units (cents).
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Construct from whole currency units.
    pub const fn from_units(units: i64) -> Self {
        Self(units * MINOR_PER_UNIT)
    }

    pub const fn minor(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:02}",
            abs / MINOR_PER_UNIT as u64,
            abs % MINOR_PER_UNIT as u64
        )
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };

        let (units_part, frac_part) = match digits.split_once('.') {
            Some((u, f)) => (u, f),
            None => (digits, ""),
        };

        if units_part.is_empty() && frac_part.is_empty() {
            return Err(LedgerError::invalid_amount(format!("'{s}' is not a number")));
        }
        if frac_part.len() > 2 {
            return Err(LedgerError::invalid_amount(format!(
                "'{s}' has more than two decimal places"
            )));
        }
        if !units_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(LedgerError::invalid_amount(format!("'{s}' is not a number")));
        }

        let units: i64 = if units_part.is_empty() {
            0
        } else {
            units_part
                .parse()
                .map_err(|_| LedgerError::invalid_amount(format!("'{s}' is out of range")))?
        };

        // "4.5" means 4.50, not 4.05.
        let mut frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().unwrap_or(0)
        };
        if frac_part.len() == 1 {
            frac *= 10;
        }

        units
            .checked_mul(MINOR_PER_UNIT)
            .and_then(|m| m.checked_add(frac))
            .map(|m| Money(sign * m))
            .ok_or_else(|| LedgerError::invalid_amount(format!("'{s}' is out of range")))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(de::Error::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(MINOR_PER_UNIT)
            .map(Money)
            .ok_or_else(|| de::Error::custom("amount out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(MINOR_PER_UNIT))
            .map(Money)
            .ok_or_else(|| de::Error::custom("amount out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        let scaled = v * MINOR_PER_UNIT as f64;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(de::Error::custom("amount has more than two decimal places"));
        }
        if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
            return Err(de::Error::custom("amount out of range"));
        }
        Ok(Money(rounded as i64))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_two_decimal_places() {
        assert_eq!(Money::from_minor(4000).to_string(), "40.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-150).to_string(), "-1.50");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn parses_common_shapes() {
        assert_eq!("40.00".parse::<Money>().unwrap(), Money::from_minor(4000));
        assert_eq!("40".parse::<Money>().unwrap(), Money::from_minor(4000));
        assert_eq!("4.5".parse::<Money>().unwrap(), Money::from_minor(450));
        assert_eq!("0.05".parse::<Money>().unwrap(), Money::from_minor(5));
        assert_eq!("-1.50".parse::<Money>().unwrap(), Money::from_minor(-150));
        assert_eq!(".75".parse::<Money>().unwrap(), Money::from_minor(75));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("12a".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
    }

    #[test]
    fn deserializes_from_numbers_and_strings() {
        assert_eq!(
            serde_json::from_str::<Money>("40.5").unwrap(),
            Money::from_minor(4050)
        );
        assert_eq!(
            serde_json::from_str::<Money>("100").unwrap(),
            Money::from_minor(10000)
        );
        assert_eq!(
            serde_json::from_str::<Money>("\"19.99\"").unwrap(),
            Money::from_minor(1999)
        );
        assert!(serde_json::from_str::<Money>("1.005").is_err());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_minor(6000)).unwrap();
        assert_eq!(json, "\"60.00\"");
    }

    #[test]
    fn checked_arithmetic_guards_overflow() {
        assert_eq!(
            Money::from_minor(100).checked_add(Money::from_minor(50)),
            Some(Money::from_minor(150))
        );
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
    }

    proptest::proptest! {
        #[test]
        fn display_parse_round_trip(minor in -1_000_000_000_000i64..1_000_000_000_000i64) {
            let m = Money::from_minor(minor);
            proptest::prop_assert_eq!(m.to_string().parse::<Money>().unwrap(), m);
        }
    }
}
