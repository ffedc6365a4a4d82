//! Raw token amount with checked arithmetic.

use core::fmt;
use core::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Rounding;
use crate::error::RouterError;
use crate::math::div_round;

/// A raw token amount in the smallest unit of its token.
///
/// `Amount` never interprets decimals; that responsibility lies with
/// [`Decimals`](super::Decimals).  Arithmetic methods are checked: they
/// return `None` on overflow, underflow, or division by zero instead of
/// wrapping.
///
/// Amounts serialize as base-10 strings so they survive JSON consumers
/// that parse numbers as doubles.
///
/// # Examples
///
/// ```
/// use smart_order_router::domain::{Amount, Rounding};
///
/// let a = Amount::from_u128(100);
/// let b = Amount::from_u128(200);
/// assert_eq!(a.checked_add(&b), Some(Amount::from_u128(300)));
/// assert_eq!(b.checked_sub(&a), Some(Amount::from_u128(100)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Amount(U256);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Maximum representable amount.
    pub const MAX: Self = Self(U256::MAX);

    /// Creates a new `Amount` from a raw [`U256`] value.
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Creates a new `Amount` from a `u128`.
    pub const fn from_u128(value: u128) -> Self {
        Self(U256::from_limbs([value as u64, (value >> 64) as u64, 0, 0]))
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn get(&self) -> U256 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Checked multiplication. Returns `None` on overflow.
    #[must_use]
    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        self.0.checked_mul(other.0).map(Self)
    }

    /// Checked division with explicit rounding direction.
    ///
    /// Returns `None` if `divisor` is zero.
    #[must_use]
    pub fn checked_div(&self, divisor: &Self, rounding: Rounding) -> Option<Self> {
        div_round(self.0, divisor.0, rounding).map(Self)
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = RouterError;

    /// Parses a base-10 integer string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str_radix(s.trim(), 10)
            .map(Self)
            .map_err(|_| RouterError::Parse(format!("invalid amount `{s}`")))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
