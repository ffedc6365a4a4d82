//! Checked arithmetic trait for domain wrapper types.
//!
//! The [`CheckedArithmetic`] trait lifts the `Option`-returning checked
//! operations of [`Amount`] into [`Result`](crate::error::Result) with a
//! distinct error per failure, so allocator and routing code can use `?`.
//!
//! # Examples
//!
//! ```
//! use smart_order_router::domain::Amount;
//! use smart_order_router::math::CheckedArithmetic;
//!
//! let a = Amount::from_u128(100);
//! let b = Amount::from_u128(200);
//! assert_eq!(a.safe_add(&b), Ok(Amount::from_u128(300)));
//! assert!(a.safe_sub(&b).is_err());
//! ```

use crate::domain::{Amount, Rounding};
use crate::error::{Result, RouterError};

/// Fallible arithmetic for domain wrapper types.
///
/// # Contract
///
/// - **No panics**: all error conditions produce `Err`.
/// - **No saturation**: errors propagate instead.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Overflow`] past the representable range.
    fn safe_add(&self, other: &Self) -> Result<Self>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Overflow`] past the representable range.
    fn safe_mul(&self, other: &Self) -> Result<Self>;

    /// Checked division with explicit [`Rounding`] direction.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DivisionByZero`] if `other` is zero.
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self> {
        self.checked_add(other)
            .ok_or(RouterError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self> {
        self.checked_sub(other)
            .ok_or(RouterError::Underflow("amount subtraction underflow"))
    }

    #[inline]
    fn safe_mul(&self, other: &Self) -> Result<Self> {
        self.checked_mul(other)
            .ok_or(RouterError::Overflow("amount multiplication overflow"))
    }

    #[inline]
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self> {
        self.checked_div(other, rounding)
            .ok_or(RouterError::DivisionByZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overflow_is_overflow() {
        assert_eq!(
            Amount::MAX.safe_add(&Amount::from_u128(1)),
            Err(RouterError::Overflow("amount addition overflow"))
        );
    }

    #[test]
    fn sub_underflow_is_underflow() {
        assert_eq!(
            Amount::ZERO.safe_sub(&Amount::from_u128(1)),
            Err(RouterError::Underflow("amount subtraction underflow"))
        );
    }

    #[test]
    fn mul_and_div() {
        let a = Amount::from_u128(7);
        assert_eq!(a.safe_mul(&Amount::from_u128(3)), Ok(Amount::from_u128(21)));
        assert_eq!(
            a.safe_div(&Amount::from_u128(2), Rounding::Up),
            Ok(Amount::from_u128(4))
        );
        assert_eq!(
            a.safe_div(&Amount::ZERO, Rounding::Down),
            Err(RouterError::DivisionByZero)
        );
    }
}
