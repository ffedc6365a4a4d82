//! Default pool factory implementation.

use crate::config::PoolConfig;
use crate::error::{Result, RouterError};
use crate::pools::PoolBox;

#[cfg(any(feature = "weighted", feature = "stable", feature = "three-clp"))]
use crate::traits::FromConfig;

/// Stateless factory for creating pool instances from configuration.
///
/// `DefaultPoolFactory` is the single entry point for constructing any
/// pool.  It matches on the [`PoolConfig`] variant, validates the
/// configuration, delegates to the pool's [`FromConfig`] implementation,
/// and wraps the result in a [`PoolBox`].
///
/// # Thread Safety
///
/// [`create`](Self::create) is a pure function with no shared mutable
/// state; it is inherently `Send + Sync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefaultPoolFactory;

impl DefaultPoolFactory {
    /// Creates a new pool instance from the given configuration.
    ///
    /// # Flow
    ///
    /// 1. Validate the configuration via [`PoolConfig::validate`].
    /// 2. Match on the config variant.
    /// 3. Delegate to the pool's [`FromConfig`] implementation.
    /// 4. Wrap the constructed pool in the corresponding [`PoolBox`]
    ///    variant.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidConfiguration`] if the configuration is
    ///   invalid or if the requested pool family's feature is not enabled.
    /// - Any error propagated from the pool's `from_config` method.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use smart_order_router::config::{PoolConfig, StableConfig};
    /// use smart_order_router::domain::{Amount, Decimals, PoolId, Ratio, Token, TokenId};
    /// use smart_order_router::factory::DefaultPoolFactory;
    /// use smart_order_router::pools::PoolState;
    /// use smart_order_router::traits::PoolMath;
    ///
    /// let d6 = Decimals::new(6).expect("valid");
    /// let usdc = Token::new(TokenId::from_bytes([1u8; 20]), d6);
    /// let usdt = Token::new(TokenId::from_bytes([2u8; 20]), d6);
    /// let state = PoolState::new(
    ///     PoolId::from("usd"),
    ///     vec![usdc, usdt],
    ///     vec![Amount::from_u128(1_000_000_000_000); 2],
    ///     Ratio::from_basis_points(4).expect("valid fee"),
    /// )
    /// .expect("valid state");
    ///
    /// let pool = DefaultPoolFactory::create(&PoolConfig::Stable(
    ///     StableConfig::new(state, 200).expect("valid config"),
    /// ))
    /// .expect("pool created");
    /// assert_eq!(pool.tokens().len(), 2);
    /// ```
    pub fn create(config: &PoolConfig) -> Result<PoolBox> {
        config.validate()?;

        match config {
            #[cfg(feature = "weighted")]
            PoolConfig::Weighted(cfg) => {
                let pool = crate::pools::weighted::WeightedPool::from_config(cfg)?;
                Ok(PoolBox::Weighted(Box::new(pool)))
            }

            #[cfg(feature = "stable")]
            PoolConfig::Stable(cfg) => {
                let pool = crate::pools::stable::StablePool::from_config(cfg)?;
                Ok(PoolBox::Stable(Box::new(pool)))
            }

            #[cfg(feature = "three-clp")]
            PoolConfig::ThreeClp(cfg) => {
                let pool = crate::pools::three_clp::ThreeClpPool::from_config(cfg)?;
                Ok(PoolBox::ThreeClp(Box::new(pool)))
            }

            // Catch-all for config variants whose pool feature is disabled.
            #[allow(unreachable_patterns)]
            _ => Err(RouterError::InvalidConfiguration(
                "requested pool type is not enabled (missing feature flag)",
            )),
        }
    }
}

#[cfg(all(test, feature = "all-pools"))]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::{StableConfig, ThreeClpConfig, WeightedConfig};
    use crate::domain::{Amount, PoolId, PoolKind, Ratio};
    use crate::pools::state::tests::tok;
    use crate::pools::{MathContext, PoolState};
    use crate::traits::PoolMath;

    // -- helpers --------------------------------------------------------------

    fn state(n: u8) -> PoolState {
        let tokens = (1..=n).map(|b| tok(b, 6)).collect();
        let Ok(s) = PoolState::new(
            PoolId::from("f"),
            tokens,
            vec![Amount::from_u128(1_000_000_000); usize::from(n)],
            Ratio::ZERO,
        ) else {
            panic!("valid state");
        };
        s
    }

    fn ratio(bps: u32) -> Ratio {
        let Ok(r) = Ratio::from_basis_points(bps) else {
            panic!("valid ratio");
        };
        r
    }

    // -- per family -----------------------------------------------------------

    #[test]
    fn creates_weighted() {
        let Ok(cfg) = WeightedConfig::new(state(2), vec![ratio(8_000), ratio(2_000)]) else {
            panic!("valid config");
        };
        let Ok(pool) = DefaultPoolFactory::create(&PoolConfig::Weighted(cfg)) else {
            panic!("pool created");
        };
        assert_eq!(pool.kind(), PoolKind::Weighted);
        assert!(matches!(pool, PoolBox::Weighted(_)));
    }

    #[test]
    fn creates_stable() {
        let Ok(cfg) = StableConfig::new(state(3), 500) else {
            panic!("valid config");
        };
        let Ok(pool) = DefaultPoolFactory::create(&PoolConfig::Stable(cfg)) else {
            panic!("pool created");
        };
        assert_eq!(pool.tokens().len(), 3);
        let Ok(out) = pool.out_given_in(
            &MathContext::default(),
            tok(1, 6).id(),
            tok(2, 6).id(),
            Amount::from_u128(1_000_000),
        ) else {
            panic!("expected quote");
        };
        assert!(out > Amount::from_u128(999_000) && out < Amount::from_u128(1_000_000));
    }

    #[test]
    fn creates_three_clp() {
        let Ok(cfg) = ThreeClpConfig::new(state(3), ratio(9_000)) else {
            panic!("valid config");
        };
        let Ok(pool) = DefaultPoolFactory::create(&PoolConfig::ThreeClp(cfg)) else {
            panic!("pool created");
        };
        assert_eq!(pool.kind(), PoolKind::ThreeClp);
        assert_eq!(pool.id(), &PoolId::from("f"));
    }
}
