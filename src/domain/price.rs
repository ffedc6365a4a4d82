//! Exchange rate between two tokens.

use core::fmt;
use core::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Amount, Rounding};
use crate::error::{Result, RouterError};
use crate::math::fixed_point::{self, ONE};

/// Decimal digits of the fixed-point scale.
const SCALE_DIGITS: usize = 18;

/// Exchange rate as 18-decimal fixed point.
///
/// Router prices are quoted as *token in per token out*: a larger price
/// is a worse rate for the trader.  Serialized as a decimal string.
///
/// # Examples
///
/// ```
/// use smart_order_router::domain::{Amount, Price, Rounding};
///
/// let p = Price::from_amounts(Amount::from_u128(300), Amount::from_u128(100), Rounding::Down)
///     .expect("non-zero denominator");
/// assert_eq!(p.to_string(), "3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(U256);

impl Price {
    /// Price ratio of zero.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Price ratio of 1:1.
    pub const ONE: Self = Self(ONE);

    /// Wraps an 18-decimal fixed-point value.
    #[must_use]
    pub const fn from_fixed(value: U256) -> Self {
        Self(value)
    }

    /// Returns the fixed-point value.
    #[must_use]
    pub const fn get(&self) -> U256 {
        self.0
    }

    /// `numerator / denominator` with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DivisionByZero`] if `denominator` is zero and
    /// [`RouterError::Overflow`] if the quotient exceeds 256 bits.
    pub fn from_amounts(numerator: Amount, denominator: Amount, rounding: Rounding) -> Result<Self> {
        if denominator.is_zero() {
            return Err(RouterError::DivisionByZero);
        }
        fixed_point::div(numerator.get(), denominator.get(), rounding).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / ONE;
        let frac = self.0 % ONE;
        if frac.is_zero() {
            return write!(f, "{whole}");
        }
        let digits = format!("{:0>SCALE_DIGITS$}", frac.to_string());
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Price {
    type Err = RouterError;

    /// Parses a non-negative decimal such as `1.25`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RouterError::Parse(format!("invalid price `{s}`"));
        let (whole, frac) = s.trim().split_once('.').unwrap_or((s.trim(), ""));
        if whole.is_empty() || frac.len() > SCALE_DIGITS {
            return Err(invalid());
        }
        let whole = U256::from_str_radix(whole, 10).map_err(|_| invalid())?;
        let frac = if frac.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{frac:0<SCALE_DIGITS$}");
            U256::from_str_radix(&padded, 10).map_err(|_| invalid())?
        };
        whole
            .checked_mul(ONE)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- from_amounts -------------------------------------------------------

    #[test]
    fn from_amounts_rounds() {
        let Ok(p) = Price::from_amounts(Amount::from_u128(1), Amount::from_u128(3), Rounding::Down)
        else {
            panic!("expected Ok");
        };
        assert_eq!(p.get(), U256::from(333_333_333_333_333_333u64));
        let Ok(p) = Price::from_amounts(Amount::from_u128(1), Amount::from_u128(3), Rounding::Up)
        else {
            panic!("expected Ok");
        };
        assert_eq!(p.get(), U256::from(333_333_333_333_333_334u64));
    }

    #[test]
    fn from_amounts_zero_denominator() {
        assert_eq!(
            Price::from_amounts(Amount::from_u128(1), Amount::ZERO, Rounding::Down),
            Err(RouterError::DivisionByZero)
        );
    }

    // -- Text form ----------------------------------------------------------

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Price::ONE.to_string(), "1");
        assert_eq!(Price::from_fixed(U256::from(1_250_000_000_000_000_000u64)).to_string(), "1.25");
        assert_eq!(Price::from_fixed(U256::from(1u8)).to_string(), "0.000000000000000001");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("".parse::<Price>().is_err());
        assert!(".5".parse::<Price>().is_err());
        assert!("1.0000000000000000001".parse::<Price>().is_err());
        assert!("-1".parse::<Price>().is_err());
    }

    #[test]
    fn serde_as_string() {
        let Ok(p) = "0.125".parse::<Price>() else {
            panic!("expected Ok");
        };
        let Ok(json) = serde_json::to_string(&p) else {
            panic!("serialize");
        };
        assert_eq!(json, "\"0.125\"");
        let Ok(back) = serde_json::from_str::<Price>(&json) else {
            panic!("deserialize");
        };
        assert_eq!(back, p);
    }
}
