//! Configuration for three-asset concentrated liquidity pools.

use crate::domain::Ratio;
use crate::error::{Result, RouterError};
use crate::pools::PoolState;

/// Configuration for a three-asset concentrated liquidity pool.
///
/// Liquidity is concentrated on the price range `[α, 1/α]` for every pair.
/// The pool is parameterized by `∛α` (`root3_alpha`); the invariant `L`
/// satisfies
///
/// ```text
/// L³ = (x + L·∛α)(y + L·∛α)(z + L·∛α)
/// ```
///
/// # Validation
///
/// - Exactly 3 tokens.
/// - `0 < root3_alpha < 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeClpConfig {
    state: PoolState,
    root3_alpha: Ratio,
}

impl ThreeClpConfig {
    /// Creates a new `ThreeClpConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] if the pool does not
    /// hold exactly 3 tokens or `root3_alpha` is not strictly between zero
    /// and one.
    pub fn new(state: PoolState, root3_alpha: Ratio) -> Result<Self> {
        let config = Self { state, root3_alpha };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        if self.state.tokens().len() != 3 {
            return Err(RouterError::InvalidConfiguration(
                "three-asset pools hold exactly 3 tokens",
            ));
        }
        if self.root3_alpha.is_zero() || self.root3_alpha == Ratio::ONE {
            return Err(RouterError::InvalidConfiguration(
                "root3_alpha must be strictly between 0 and 1",
            ));
        }
        Ok(())
    }

    /// Shared pool state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    /// `∛α` in fixed point.
    #[must_use]
    pub const fn root3_alpha(&self) -> Ratio {
        self.root3_alpha
    }
}
