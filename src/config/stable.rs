//! Configuration for StableSwap pools.

use crate::error::{Result, RouterError};
use crate::pools::PoolState;

/// Most tokens a stable pool may hold.
pub const MAX_STABLE_TOKENS: usize = 5;

/// Largest accepted amplification coefficient.
pub const MAX_AMP: u64 = 5_000;

/// Configuration for a StableSwap pool.
///
/// # Amplification Parameter
///
/// The amplification `A` controls the curve shape:
///
/// - `A = 1`: close to constant product.
/// - `A → ∞`: approaches constant sum (1:1 swaps).
/// - Typical range for pegged assets: 50–2000.
///
/// `A` is given unscaled; the math applies the on-chain precision of
/// 1000 internally.
///
/// # Invariant
///
/// ```text
/// A · nⁿ · Σxᵢ + D = A · D · nⁿ + Dⁿ⁺¹ / (nⁿ · ∏xᵢ)
/// ```
///
/// # Validation
///
/// - 2 to 5 tokens.
/// - `1 ≤ A ≤ 5000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableConfig {
    state: PoolState,
    amplification: u64,
}

impl StableConfig {
    /// Creates a new `StableConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] if the token count or
    /// the amplification is out of range.
    pub fn new(state: PoolState, amplification: u64) -> Result<Self> {
        let config = Self {
            state,
            amplification,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        if self.state.tokens().len() > MAX_STABLE_TOKENS {
            return Err(RouterError::InvalidConfiguration(
                "stable pools hold at most 5 tokens",
            ));
        }
        if self.amplification == 0 || self.amplification > MAX_AMP {
            return Err(RouterError::InvalidConfiguration(
                "amplification must be within 1..=5000",
            ));
        }
        Ok(())
    }

    /// Shared pool state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    /// Unscaled amplification coefficient.
    #[must_use]
    pub const fn amplification(&self) -> u64 {
        self.amplification
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Amount, PoolId, Ratio};
    use crate::pools::state::tests::tok;

    fn state(n: u8) -> PoolState {
        let tokens = (1..=n).map(|b| tok(b, 18)).collect();
        let balances = vec![Amount::from_u128(1_000); usize::from(n)];
        let Ok(s) = PoolState::new(PoolId::from("s"), tokens, balances, Ratio::ZERO) else {
            panic!("valid state");
        };
        s
    }

    #[test]
    fn valid_amplification_range() {
        assert!(StableConfig::new(state(2), 1).is_ok());
        assert!(StableConfig::new(state(3), 200).is_ok());
        assert!(StableConfig::new(state(2), MAX_AMP).is_ok());
    }

    #[test]
    fn zero_or_huge_amplification_rejected() {
        assert!(matches!(
            StableConfig::new(state(2), 0),
            Err(RouterError::InvalidConfiguration(_))
        ));
        assert!(StableConfig::new(state(2), MAX_AMP + 1).is_err());
    }

    #[test]
    fn six_tokens_rejected() {
        assert!(StableConfig::new(state(6), 100).is_err());
    }
}
