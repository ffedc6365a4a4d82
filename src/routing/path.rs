//! Swap paths through one or more pools.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::PoolSnapshot;
use crate::domain::{Amount, PoolId, Price, TokenId};
use crate::error::{Result, RouterError};
use crate::math::fixed_point::mul_up;
use crate::pools::MathContext;
use crate::traits::PoolMath;

/// One traversal of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hop {
    /// Pool traversed.
    pub pool: PoolId,
    /// Token paid into the pool.
    pub token_in: TokenId,
    /// Token received from the pool.
    pub token_out: TokenId,
}

/// Ordered sequence of hops where each hop's output token is the next
/// hop's input token.
///
/// # Invariants
///
/// - At least one hop.
/// - Consecutive hops chain on their boundary token.
/// - No pool is traversed twice.
/// - No hop swaps a token for itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Hop>", into = "Vec<Hop>")]
pub struct Path {
    hops: Vec<Hop>,
}

impl Path {
    /// Validates and wraps `hops`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] if any invariant is violated.
    pub fn new(hops: Vec<Hop>) -> Result<Self> {
        if hops.is_empty() {
            return Err(RouterError::InvalidInput("path without hops"));
        }
        if hops.iter().any(|h| h.token_in == h.token_out) {
            return Err(RouterError::InvalidInput("hop swaps a token for itself"));
        }
        if hops.windows(2).any(|w| match w {
            [a, b] => a.token_out != b.token_in,
            _ => false,
        }) {
            return Err(RouterError::InvalidInput("hops do not chain"));
        }
        for (i, hop) in hops.iter().enumerate() {
            if hops.iter().skip(i + 1).any(|other| other.pool == hop.pool) {
                return Err(RouterError::InvalidInput("pool used twice in one path"));
            }
        }
        Ok(Self { hops })
    }

    /// Single-hop path.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] if `token_in == token_out`.
    pub fn direct(pool: PoolId, token_in: TokenId, token_out: TokenId) -> Result<Self> {
        Self::new(vec![Hop {
            pool,
            token_in,
            token_out,
        }])
    }

    /// Hops in trade order.
    #[must_use]
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Number of hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Always `false`; a path has at least one hop.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Token paid into the first pool.
    #[must_use]
    pub fn token_in(&self) -> Option<TokenId> {
        self.hops.first().map(|h| h.token_in)
    }

    /// Token received from the last pool.
    #[must_use]
    pub fn token_out(&self) -> Option<TokenId> {
        self.hops.last().map(|h| h.token_out)
    }

    /// `true` if the path traverses `pool`.
    #[must_use]
    pub fn uses_pool(&self, pool: &PoolId) -> bool {
        self.hops.iter().any(|h| &h.pool == pool)
    }

    /// Output of pushing `amount_in` through every hop.
    ///
    /// # Errors
    ///
    /// The first pool error along the path.
    pub fn out_given_in(
        &self,
        snapshot: &PoolSnapshot,
        ctx: &MathContext,
        amount_in: Amount,
    ) -> Result<Amount> {
        self.hops.iter().try_fold(amount_in, |amount, hop| {
            snapshot
                .pool(&hop.pool)?
                .out_given_in(ctx, hop.token_in, hop.token_out, amount)
        })
    }

    /// Input needed to receive `amount_out` from the last hop, walking the
    /// hops backwards.
    ///
    /// # Errors
    ///
    /// The first pool error along the path.
    pub fn in_given_out(
        &self,
        snapshot: &PoolSnapshot,
        ctx: &MathContext,
        amount_out: Amount,
    ) -> Result<Amount> {
        self.hops.iter().rev().try_fold(amount_out, |amount, hop| {
            snapshot
                .pool(&hop.pool)?
                .in_given_out(ctx, hop.token_in, hop.token_out, amount)
        })
    }

    /// Spot prices of each hop, in trade order.
    ///
    /// # Errors
    ///
    /// The first pool error along the path.
    pub fn hop_prices(&self, snapshot: &PoolSnapshot, ctx: &MathContext) -> Result<Vec<Price>> {
        self.hops
            .iter()
            .map(|hop| {
                snapshot
                    .pool(&hop.pool)?
                    .spot_price(ctx, hop.token_in, hop.token_out)
            })
            .collect()
    }

    /// Marginal price of the whole path at zero flow: the product of the
    /// hop prices, rounded up.
    ///
    /// # Errors
    ///
    /// The first pool error along the path, or [`RouterError::Overflow`].
    pub fn spot_price(&self, snapshot: &PoolSnapshot, ctx: &MathContext) -> Result<Price> {
        self.hop_prices(snapshot, ctx)?
            .into_iter()
            .try_fold(Price::ONE, |acc, p| mul_up(acc.get(), p.get()).map(Price::from_fixed))
    }
}

impl TryFrom<Vec<Hop>> for Path {
    type Error = RouterError;

    fn try_from(hops: Vec<Hop>) -> Result<Self> {
        Self::new(hops)
    }
}

impl From<Path> for Vec<Hop> {
    fn from(path: Path) -> Self {
        path.hops
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hop) in self.hops.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", hop.pool)?;
        }
        Ok(())
    }
}
