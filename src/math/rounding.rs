//! Rounding helpers for integer division.
//!
//! This module provides [`div_round`], a free function that performs
//! [`U256`] division with an explicit [`Rounding`] direction.  It is the
//! low-level building block under the fixed-point layer and the domain
//! types such as [`Amount`](crate::domain::Amount).
//!
//! # Convention
//!
//! **Always round against the trader** (protocol-favorable):
//!
//! | Quantity | Direction |
//! |----------|-----------|
//! | Output amount | [`Rounding::Down`] |
//! | Input amount | [`Rounding::Up`] |
//! | Fee amount | [`Rounding::Up`] |
//!
//! # Examples
//!
//! ```
//! use alloy_primitives::U256;
//! use smart_order_router::domain::Rounding;
//! use smart_order_router::math::div_round;
//!
//! let ten = U256::from(10u8);
//! let three = U256::from(3u8);
//! assert_eq!(div_round(ten, three, Rounding::Down), Some(U256::from(3u8)));
//! assert_eq!(div_round(ten, three, Rounding::Up), Some(U256::from(4u8)));
//! assert_eq!(div_round(ten, U256::ZERO, Rounding::Down), None);
//! ```

use alloy_primitives::U256;

use crate::domain::Rounding;

/// Integer division of [`U256`] values with explicit rounding direction.
///
/// - [`Rounding::Down`]: floor division.
/// - [`Rounding::Up`]: ceiling division, computed as
///   `floor(n / d) + (n % d != 0)` so it cannot overflow.
///
/// Returns [`None`] if `denominator` is zero.
#[must_use]
pub fn div_round(numerator: U256, denominator: U256, rounding: Rounding) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = numerator / denominator;
    match rounding {
        Rounding::Down => Some(quotient),
        Rounding::Up => {
            if (numerator % denominator).is_zero() {
                Some(quotient)
            } else {
                // quotient < MAX whenever a remainder exists
                Some(quotient + U256::from(1u8))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    #[test]
    fn div_by_zero_returns_none() {
        assert_eq!(div_round(u(100), U256::ZERO, Rounding::Down), None);
        assert_eq!(div_round(u(100), U256::ZERO, Rounding::Up), None);
        assert_eq!(div_round(U256::ZERO, U256::ZERO, Rounding::Down), None);
    }

    #[test]
    fn zero_numerator() {
        assert_eq!(div_round(U256::ZERO, u(5), Rounding::Down), Some(U256::ZERO));
        assert_eq!(div_round(U256::ZERO, u(5), Rounding::Up), Some(U256::ZERO));
    }

    #[test]
    fn exact_division_agrees() {
        assert_eq!(div_round(u(100), u(10), Rounding::Down), Some(u(10)));
        assert_eq!(div_round(u(100), u(10), Rounding::Up), Some(u(10)));
    }

    #[test]
    fn remainder_rounds_by_direction() {
        assert_eq!(div_round(u(9), u(10), Rounding::Down), Some(U256::ZERO));
        assert_eq!(div_round(u(9), u(10), Rounding::Up), Some(u(1)));
    }

    #[test]
    fn max_by_max_minus_one() {
        // MAX / (MAX - 1): quotient 1, remainder 1 → ceil 2
        let d = U256::MAX - u(1);
        assert_eq!(div_round(U256::MAX, d, Rounding::Down), Some(u(1)));
        assert_eq!(div_round(U256::MAX, d, Rounding::Up), Some(u(2)));
    }

    #[test]
    fn max_by_one_does_not_overflow() {
        assert_eq!(div_round(U256::MAX, u(1), Rounding::Up), Some(U256::MAX));
    }
}
