//! Configuration for weighted pools (Balancer style).

use alloy_primitives::U256;

use crate::domain::Ratio;
use crate::error::{Result, RouterError};
use crate::math::fixed_point::ONE;
use crate::pools::PoolState;

/// Most tokens a weighted pool may hold.
pub const MAX_WEIGHTED_TOKENS: usize = 8;

/// Smallest normalized weight (1%).
pub const MIN_WEIGHT: U256 = U256::from_limbs([10_000_000_000_000_000, 0, 0, 0]);

/// Configuration for a weighted pool holding N tokens with fixed
/// normalized weights.
///
/// # Invariant
///
/// ```text
/// ∏(Bᵢ ^ Wᵢ) = k
/// ```
///
/// where `Bᵢ` is the balance of token `i` and `Wᵢ` its normalized weight.
///
/// # Validation
///
/// - 2 to 8 tokens, one weight per token.
/// - Every weight at least 1%.
/// - Weights sum to exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedConfig {
    state: PoolState,
    weights: Vec<Ratio>,
}

impl WeightedConfig {
    /// Creates a new `WeightedConfig`.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidConfiguration`] if the token count is out of
    ///   range or the weight count differs from it.
    /// - [`RouterError::InvalidWeight`] if a weight is below 1% or the
    ///   weights do not sum to one.
    pub fn new(state: PoolState, weights: Vec<Ratio>) -> Result<Self> {
        let config = Self { state, weights };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        let n = self.state.tokens().len();
        if n > MAX_WEIGHTED_TOKENS {
            return Err(RouterError::InvalidConfiguration(
                "weighted pools hold at most 8 tokens",
            ));
        }
        if self.weights.len() != n {
            return Err(RouterError::InvalidConfiguration(
                "tokens and weights must have equal length",
            ));
        }
        let mut sum = U256::ZERO;
        for w in &self.weights {
            if w.get() < MIN_WEIGHT {
                return Err(RouterError::InvalidWeight(
                    "every weight must be at least 1%",
                ));
            }
            sum += w.get();
        }
        if sum != ONE {
            return Err(RouterError::InvalidWeight("weights must sum to one"));
        }
        Ok(())
    }

    /// Shared pool state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    /// Normalized weights in pool order.
    #[must_use]
    pub fn weights(&self) -> &[Ratio] {
        &self.weights
    }
}
