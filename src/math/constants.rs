//! Numeric constants shared by the pool math.
//!
//! These are fixed properties of the on-chain arithmetic, not tuning
//! knobs.  Tunable policy (Newton iteration counts, balance-ratio limit)
//! lives in [`RouterConfig`](crate::config::RouterConfig) and reaches the
//! math through [`MathContext`](crate::pools::MathContext).

use alloy_primitives::{uint, U256};

/// Largest operand for which `x · x · x` in fixed point fits in 256 bits
/// without splitting (`4.87e31`).
pub const SAFE_LARGE_POW3_THRESHOLD: U256 = uint!(48_700_000_000_000_000_000_000_000_000_000_U256);

/// Split point used by the large-cube path (`1e9`, half the decimal scale).
pub const MIDDECIMAL: U256 = uint!(1_000_000_000_U256);

/// Default per-operation balance-ratio limit (30%).
pub const DEFAULT_BALANCE_RATIO_LIMIT: U256 = uint!(300_000_000_000_000_000_U256);

/// Default step-shrink factor for the Newton stop rule (8×).
pub const DEFAULT_SHRINK_FACTOR: U256 = uint!(8_000_000_000_000_000_000_U256);

/// Default minimum Newton iterations before the shrink rule may stop.
pub const DEFAULT_MIN_ITERATIONS: u32 = 5;

/// Default hard cap on Newton iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 255;

/// Relative error bound of [`log_exp::pow`](super::log_exp::pow), as a
/// fixed-point fraction (`1e-14`).
pub const MAX_POW_RELATIVE_ERROR: U256 = uint!(10_000_U256);

/// Precision of the stable-pool amplification parameter.
pub const AMP_PRECISION: U256 = uint!(1_000_U256);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed_point::ONE;

    #[test]
    fn threshold_is_487e29() {
        assert_eq!(
            SAFE_LARGE_POW3_THRESHOLD,
            U256::from(487u16) * U256::from(10u8).pow(U256::from(29u8))
        );
    }

    #[test]
    fn middecimal_squared_is_one() {
        assert_eq!(MIDDECIMAL * MIDDECIMAL, ONE);
    }

    #[test]
    fn ratio_limit_is_thirty_percent() {
        assert_eq!(DEFAULT_BALANCE_RATIO_LIMIT * U256::from(10u8), ONE * U256::from(3u8));
    }
}
