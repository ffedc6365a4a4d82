//! Candidate path proposal.
//!
//! Proposes a bounded set of paths between two tokens:
//!
//! - **direct**: every routable pool holding both tokens;
//! - **multi-hop**: simple token walks of 2 to `max_hops` hops, each hop
//!   through the deepest pool for its token pair. At every intermediate
//!   token only the `max_pools` deepest onward hops are walked further.
//!
//! Candidates are ranked by their bottleneck liquidity (the shallowest hop,
//! expressed in units of the output token) and truncated to `max_pools`,
//! so the allocator never sees the full combinatorial path space.

use std::cmp::Ordering;
use std::collections::HashMap;

use alloy_primitives::U256;

use super::{Hop, Path, PoolSnapshot};
use crate::domain::{Amount, PoolId, TokenId};
use crate::error::{Result, RouterError};
use crate::math::fixed_point::div_down;
use crate::pools::{MathContext, PoolBox};
use crate::traits::PoolMath;

/// A proposed path with its ranking key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The path.
    pub path: Path,
    /// Bottleneck liquidity, 18-decimal output-token units.
    pub liquidity: U256,
}

/// Proposes at most `max_pools` paths from `token_in` to `token_out`.
///
/// Pools whose liquidity cannot be evaluated for a recoverable reason
/// (e.g. a Newton solve hitting its cap) are left out of the proposal.
///
/// # Errors
///
/// - [`RouterError::InvalidInput`] if the tokens are equal or a token is
///   not held by any pool.
/// - [`RouterError::NoPathFound`] if no path exists within `max_hops`.
/// - Non-recoverable pool errors.
pub fn propose_paths(
    snapshot: &PoolSnapshot,
    ctx: &MathContext,
    token_in: TokenId,
    token_out: TokenId,
    max_pools: usize,
    max_hops: usize,
) -> Result<Vec<Candidate>> {
    if token_in == token_out {
        return Err(RouterError::InvalidInput("source and destination token are equal"));
    }
    if !snapshot.knows_token(token_in) {
        return Err(RouterError::InvalidInput("unknown source token"));
    }
    if !snapshot.knows_token(token_out) {
        return Err(RouterError::InvalidInput("unknown destination token"));
    }

    let mut proposer = Proposer {
        snapshot,
        ctx,
        token_out,
        max_hops,
        branching: max_pools.max(1),
        liquidity: HashMap::new(),
    };
    let mut paths = proposer.direct(token_in)?;
    if max_hops > 1 {
        let mut hops = Vec::with_capacity(max_hops);
        let mut visited = vec![token_in];
        proposer.walk(token_in, &mut hops, &mut visited, &mut paths)?;
    }

    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        match proposer.bottleneck(&path) {
            Ok(liquidity) => candidates.push(Candidate { path, liquidity }),
            Err(e) if e.is_recoverable_for_path() => {
                tracing::warn!(%path, error = %e, "candidate dropped while ranking");
            }
            Err(e) => return Err(e),
        }
    }
    candidates.sort_by(rank);
    candidates.truncate(max_pools);

    tracing::debug!(
        candidates = candidates.len(),
        %token_in,
        %token_out,
        "paths proposed"
    );
    if candidates.is_empty() {
        return Err(RouterError::NoPathFound);
    }
    Ok(candidates)
}

/// Deepest first, then fewer hops, then pool ids for determinism.
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.liquidity
        .cmp(&a.liquidity)
        .then_with(|| a.path.len().cmp(&b.path.len()))
        .then_with(|| pool_ids(&a.path).cmp(&pool_ids(&b.path)))
}

fn pool_ids(path: &Path) -> Vec<&PoolId> {
    path.hops().iter().map(|h| &h.pool).collect()
}

/// Per-hop liquidity keyed by pool and direction; `None` marks a pool
/// that failed recoverably.
type LiquidityCache<'a> = HashMap<(&'a PoolId, TokenId, TokenId), Option<Amount>>;

struct Proposer<'a> {
    snapshot: &'a PoolSnapshot,
    ctx: &'a MathContext,
    token_out: TokenId,
    max_hops: usize,
    branching: usize,
    liquidity: LiquidityCache<'a>,
}

impl<'a> Proposer<'a> {
    fn direct(&self, token_in: TokenId) -> Result<Vec<Path>> {
        self.snapshot
            .routable_with(token_in)
            .filter(|pool| pool.contains(self.token_out))
            .map(|pool| Path::direct(pool.id().clone(), token_in, self.token_out))
            .collect()
    }

    /// Depth-first enumeration of simple token walks ending at the
    /// destination with at least two hops.
    fn walk(
        &mut self,
        at: TokenId,
        hops: &mut Vec<Hop>,
        visited: &mut Vec<TokenId>,
        out: &mut Vec<Path>,
    ) -> Result<()> {
        if hops.len() >= self.max_hops {
            return Ok(());
        }
        let mut next: Vec<TokenId> = self
            .snapshot
            .neighbours(at)
            .into_iter()
            .filter(|t| !visited.contains(t))
            .collect();
        next.sort();

        let mut finals = Vec::new();
        let mut onward = Vec::new();
        for token in next {
            let is_last = token == self.token_out;
            // A single hop to the destination is a direct path.
            if is_last && hops.is_empty() {
                continue;
            }
            // Leave room for the final hop.
            if !is_last && hops.len() + 2 > self.max_hops {
                continue;
            }
            let Some((pool, liquidity)) = self.deepest_pool(at, token, hops)? else {
                continue;
            };
            if is_last {
                finals.push((token, pool));
            } else {
                onward.push((token, pool, liquidity));
            }
        }
        // Stable sort: ties stay in token order.
        onward.sort_by(|a, b| b.2.cmp(&a.2));
        onward.truncate(self.branching);

        for (token, pool) in finals {
            hops.push(Hop {
                pool: pool.id().clone(),
                token_in: at,
                token_out: token,
            });
            out.push(Path::new(hops.clone())?);
            hops.pop();
        }
        for (token, pool, _) in onward {
            hops.push(Hop {
                pool: pool.id().clone(),
                token_in: at,
                token_out: token,
            });
            visited.push(token);
            self.walk(token, hops, visited, out)?;
            visited.pop();
            hops.pop();
        }
        Ok(())
    }

    /// Routable pool for `from -> to` with the highest normalized
    /// liquidity, skipping pools already on the path.
    fn deepest_pool(
        &mut self,
        from: TokenId,
        to: TokenId,
        hops: &[Hop],
    ) -> Result<Option<(&'a PoolBox, Amount)>> {
        let snapshot = self.snapshot;
        let mut best: Option<(&'a PoolBox, Amount)> = None;
        for pool in snapshot.routable_with(from) {
            if !pool.contains(to) || hops.iter().any(|h| &h.pool == pool.id()) {
                continue;
            }
            let Some(liquidity) = self.hop_liquidity(pool, from, to)? else {
                continue;
            };
            if best.as_ref().map_or(true, |(_, l)| liquidity > *l) {
                best = Some((pool, liquidity));
            }
        }
        Ok(best)
    }

    /// Normalized liquidity of `pool` for `from -> to`, solved at most
    /// once per proposal.
    fn hop_liquidity(
        &mut self,
        pool: &'a PoolBox,
        from: TokenId,
        to: TokenId,
    ) -> Result<Option<Amount>> {
        let key = (pool.id(), from, to);
        if let Some(cached) = self.liquidity.get(&key) {
            return Ok(*cached);
        }
        let liquidity = match pool.normalized_liquidity(self.ctx, from, to) {
            Ok(l) => Some(l),
            Err(e) if e.is_recoverable_for_path() => {
                tracing::warn!(pool = %pool.id(), error = %e, "pool skipped for hop");
                None
            }
            Err(e) => return Err(e),
        };
        self.liquidity.insert(key, liquidity);
        Ok(liquidity)
    }

    /// Smallest hop liquidity, each converted into output-token units
    /// through the spot prices of the hops after it.
    fn bottleneck(&mut self, path: &Path) -> Result<U256> {
        let snapshot = self.snapshot;
        let prices = path.hop_prices(snapshot, self.ctx)?;
        let mut bottleneck = U256::MAX;
        for (k, hop) in path.hops().iter().enumerate() {
            let pool = snapshot.pool(&hop.pool)?;
            let raw = match self.hop_liquidity(pool, hop.token_in, hop.token_out)? {
                Some(raw) => raw,
                None => pool.normalized_liquidity(self.ctx, hop.token_in, hop.token_out)?,
            };
            let mut liquidity = self.snapshot.decimals_of(hop.token_out)?.upscale(raw.get())?;
            for price in prices.iter().skip(k + 1) {
                liquidity = div_down(liquidity, price.get())?;
            }
            bottleneck = bottleneck.min(liquidity);
        }
        Ok(bottleneck)
    }
}
