//! Token decimal places and the scaling to 18-decimal fixed point.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use super::Rounding;
use crate::error::{Result, RouterError};
use crate::math::div_round;

/// Maximum allowed decimal places; also the fixed-point scale.
const MAX_DECIMALS: u8 = 18;

/// Number of decimal places of a token's raw amounts.
///
/// Valid range is `0..=18`.  Pool math runs on 18-decimal fixed point, so
/// every raw balance and amount is multiplied by
/// [`scaling_factor`](Self::scaling_factor) on the way in and divided by it
/// on the way out.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use smart_order_router::domain::{Decimals, Rounding};
///
/// let usdc = Decimals::new(6).expect("6 is valid");
/// let one_usdc = U256::from(1_000_000u64);
/// let scaled = usdc.upscale(one_usdc).expect("fits");
/// assert_eq!(scaled, U256::from(10u8).pow(U256::from(18u8)));
/// assert_eq!(usdc.downscale(scaled, Rounding::Down).expect("ok"), one_usdc);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Decimals(u8);

impl Default for Decimals {
    fn default() -> Self {
        Self::MAX
    }
}

impl Decimals {
    /// Zero decimal places.
    pub const ZERO: Self = Self(0);

    /// 18 decimal places, the fixed-point scale itself.
    pub const MAX: Self = Self(MAX_DECIMALS);

    /// Creates a new `Decimals` value after validating the range.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPrecision`] if `value` exceeds 18.
    pub const fn new(value: u8) -> Result<Self> {
        if value > MAX_DECIMALS {
            return Err(RouterError::InvalidPrecision("decimals must be 0..=18"));
        }
        Ok(Self(value))
    }

    /// Returns the raw decimal count.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// `10^(18 − decimals)`: the factor from raw units to fixed point.
    #[must_use]
    pub fn scaling_factor(&self) -> U256 {
        let mut factor = U256::from(1u8);
        for _ in self.0..MAX_DECIMALS {
            factor *= U256::from(10u8);
        }
        factor
    }

    /// Converts a raw amount to 18-decimal fixed point.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Overflow`] if the scaled value exceeds 256
    /// bits.
    pub fn upscale(&self, raw: U256) -> Result<U256> {
        raw.checked_mul(self.scaling_factor())
            .ok_or(RouterError::Overflow("upscale"))
    }

    /// Converts an 18-decimal fixed-point value back to raw units.
    ///
    /// # Errors
    ///
    /// Never fails for a valid `Decimals`; the `Result` keeps the call
    /// sites uniform with [`upscale`](Self::upscale).
    pub fn downscale(&self, scaled: U256, rounding: Rounding) -> Result<U256> {
        div_round(scaled, self.scaling_factor(), rounding).ok_or(RouterError::DivisionByZero)
    }
}

impl TryFrom<u8> for Decimals {
    type Error = RouterError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Decimals> for u8 {
    fn from(value: Decimals) -> Self {
        value.0
    }
}
