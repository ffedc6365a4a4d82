//! Numeric policy threaded through every pool computation.

use alloy_primitives::U256;

use crate::domain::Ratio;
use crate::error::{Result, RouterError};
use crate::math::constants::DEFAULT_BALANCE_RATIO_LIMIT;
use crate::math::fixed_point::mul_down;
use crate::math::NewtonPolicy;

/// Newton stop rule and balance-ratio limit for one routing computation.
///
/// Built once from [`RouterConfig`](crate::config::RouterConfig) and
/// passed by reference into every pool call; the pool math holds no
/// global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathContext {
    newton: NewtonPolicy,
    balance_ratio_limit: U256,
}

impl Default for MathContext {
    fn default() -> Self {
        Self {
            newton: NewtonPolicy::default(),
            balance_ratio_limit: DEFAULT_BALANCE_RATIO_LIMIT,
        }
    }
}

impl MathContext {
    /// Creates a context.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] unless the
    /// balance-ratio limit is within `(0, 1)`; a limit of one would let a
    /// single operation drain a balance.
    pub fn new(newton: NewtonPolicy, balance_ratio_limit: Ratio) -> Result<Self> {
        if balance_ratio_limit.is_zero() || balance_ratio_limit == Ratio::ONE {
            return Err(RouterError::InvalidConfiguration(
                "balance ratio limit must be within (0, 1)",
            ));
        }
        Ok(Self {
            newton,
            balance_ratio_limit: balance_ratio_limit.get(),
        })
    }

    /// Returns a copy using a different Newton policy.
    #[must_use]
    pub const fn with_newton(mut self, newton: NewtonPolicy) -> Self {
        self.newton = newton;
        self
    }

    /// Newton stop rule.
    #[must_use]
    pub const fn newton(&self) -> &NewtonPolicy {
        &self.newton
    }

    /// Maximum fraction of a balance a single operation may move.
    #[must_use]
    pub const fn balance_ratio_limit(&self) -> U256 {
        self.balance_ratio_limit
    }

    /// Largest amount allowed against an upscaled `balance`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Overflow`] if the product overflows.
    pub fn ratio_cap(&self, balance: U256) -> Result<U256> {
        mul_down(balance, self.balance_ratio_limit)
    }

    /// Checks `amount` against the cap of `balance`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::SwapLimitExceeded`] naming `side` when the
    /// amount is above the cap.
    pub fn check_ratio(&self, amount: U256, balance: U256, side: &'static str) -> Result<()> {
        if amount > self.ratio_cap(balance)? {
            return Err(RouterError::SwapLimitExceeded(side));
        }
        Ok(())
    }
}
