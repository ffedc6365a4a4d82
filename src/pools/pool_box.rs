//! Enum dispatch wrapper for all pool types.
//!
//! [`PoolBox`] wraps every concrete pool implementation behind a single
//! enum, enabling heterogeneous collections and zero-cost static
//! dispatch.  Each variant is feature-gated to match its pool type.

use alloy_primitives::U256;

#[cfg(feature = "stable")]
use super::stable::StablePool;
#[cfg(feature = "three-clp")]
use super::three_clp::ThreeClpPool;
#[cfg(feature = "weighted")]
use super::weighted::WeightedPool;
use super::MathContext;

use crate::domain::{Amount, PoolId, PoolKind, Price, Ratio, Token, TokenId};
use crate::error::Result;
use crate::traits::PoolMath;

/// Zero-cost dispatch enum wrapping all concrete pool implementations.
///
/// Each variant is feature-gated behind its respective Cargo feature
/// flag.  The enum implements [`PoolMath`] by delegating every method
/// call to the inner pool via `match`, so the routing pipeline handles a
/// closed set of families without trait objects.
///
/// # Example
///
/// ```text
/// let pool = PoolBox::Weighted(Box::new(weighted_pool));
/// let out = pool.out_given_in(&ctx, a, b, amount)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolBox {
    /// Weighted pool (Balancer style).
    #[cfg(feature = "weighted")]
    Weighted(Box<WeightedPool>),

    /// StableSwap pool (Curve style).
    #[cfg(feature = "stable")]
    Stable(Box<StablePool>),

    /// Three-asset concentrated liquidity pool.
    #[cfg(feature = "three-clp")]
    ThreeClp(Box<ThreeClpPool>),
}

/// Helper macro to delegate a method call to every PoolBox variant.
///
/// Generates a match arm for each feature-gated variant, calling the
/// same method on the inner pool.
macro_rules! delegate {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self {
            #[cfg(feature = "weighted")]
            PoolBox::Weighted(p) => p.$method($($arg),*),
            #[cfg(feature = "stable")]
            PoolBox::Stable(p) => p.$method($($arg),*),
            #[cfg(feature = "three-clp")]
            PoolBox::ThreeClp(p) => p.$method($($arg),*),
        }
    };
}

impl PoolMath for PoolBox {
    fn id(&self) -> &PoolId {
        delegate!(self, id())
    }

    fn kind(&self) -> PoolKind {
        delegate!(self, kind())
    }

    fn tokens(&self) -> &[Token] {
        delegate!(self, tokens())
    }

    fn balances(&self) -> &[Amount] {
        delegate!(self, balances())
    }

    fn swap_fee(&self) -> Ratio {
        delegate!(self, swap_fee())
    }

    fn is_enabled(&self) -> bool {
        delegate!(self, is_enabled())
    }

    fn invariant(&self, ctx: &MathContext) -> Result<U256> {
        delegate!(self, invariant(ctx))
    }

    fn out_given_in(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: Amount,
    ) -> Result<Amount> {
        delegate!(self, out_given_in(ctx, token_in, token_out, amount_in))
    }

    fn in_given_out(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_out: Amount,
    ) -> Result<Amount> {
        delegate!(self, in_given_out(ctx, token_in, token_out, amount_out))
    }

    fn spot_price(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Price> {
        delegate!(self, spot_price(ctx, token_in, token_out))
    }

    fn max_amount_in(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount> {
        delegate!(self, max_amount_in(ctx, token_in, token_out))
    }

    fn max_amount_out(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount> {
        delegate!(self, max_amount_out(ctx, token_in, token_out))
    }

    fn normalized_liquidity(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<Amount> {
        delegate!(self, normalized_liquidity(ctx, token_in, token_out))
    }
}

impl PoolBox {
    /// `true` if the pool takes part in routing: swaps enabled and no
    /// zero balance.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        self.is_enabled() && !self.balances().iter().any(Amount::is_zero)
    }
}
