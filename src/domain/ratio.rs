//! Fixed-point fraction in `[0, 1]` for fees, weights and limits.

use core::fmt;

use alloy_primitives::U256;
use rust_decimal::Decimal;

use super::Rounding;
use crate::error::{Result, RouterError};
use crate::math::fixed_point::{self, ONE};

/// Basis points in one whole.
const BPS_PER_ONE: u64 = 10_000;

/// A fraction between zero and one, stored as 18-decimal fixed point.
///
/// Used for swap fees, normalized weights, the balance-ratio limit and the
/// allocator's tolerances.  Construction rejects values above one.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use smart_order_router::domain::{Ratio, Rounding};
///
/// let fee = Ratio::from_basis_points(30).expect("valid");
/// let amount = U256::from(1_000_000u64);
/// assert_eq!(fee.apply(amount, Rounding::Up).expect("fits"), U256::from(3_000u64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ratio(U256);

impl Ratio {
    /// Zero.
    pub const ZERO: Self = Self(U256::ZERO);

    /// One whole (100%).
    pub const ONE: Self = Self(ONE);

    /// Creates a ratio from an 18-decimal fixed-point value.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] if `value` exceeds one.
    pub fn from_fixed(value: U256) -> Result<Self> {
        if value > ONE {
            return Err(RouterError::InvalidInput("ratio must not exceed one"));
        }
        Ok(Self(value))
    }

    /// Creates a ratio from basis points (1 bp = 0.01%).
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] above 10 000 bp.
    pub fn from_basis_points(bps: u32) -> Result<Self> {
        let scaled = U256::from(bps) * ONE / U256::from(BPS_PER_ONE);
        Self::from_fixed(scaled)
    }

    /// Creates a ratio from a decimal such as `0.003`.
    ///
    /// Digits beyond the 18th decimal are truncated.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] if the value is negative or
    /// above one.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        Self::from_fixed(fixed_point::from_decimal(value, Rounding::Down)?)
    }

    /// Returns the fixed-point value.
    #[must_use]
    pub const fn get(&self) -> U256 {
        self.0
    }

    /// Returns `true` for a zero ratio.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `1 − self`.
    #[must_use]
    pub fn complement(&self) -> Self {
        Self(fixed_point::complement(self.0))
    }

    /// `value · self` with an explicit rounding direction.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Overflow`] if the product exceeds 256 bits.
    pub fn apply(&self, value: U256, rounding: Rounding) -> Result<U256> {
        fixed_point::mul(value, self.0, rounding)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", fixed_point::to_decimal(self.0).normalize())
    }
}
