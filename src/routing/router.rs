//! The routing entry point.

use alloy_primitives::U256;

use super::allocator::{allocate, allocate_partial, AllocatorParams, Allocation};
use super::limits::{compute_limits, LimitedPath};
use super::proposal::propose_paths;
use super::{PathAllocation, PoolSnapshot, RouteResult};
use crate::config::RouterConfig;
use crate::domain::{Amount, Price, Rounding, SwapSpec, SwapType, TokenId};
use crate::error::{Result, RouterError};
use crate::math::CheckedArithmetic;
use crate::pools::MathContext;

/// Finds the best split of a trade across the paths of a snapshot.
///
/// A route runs four stages:
///
/// 1. propose at most `max_pools` candidate paths;
/// 2. compute each path's limit, dropping paths that cannot trade;
/// 3. order the survivors by marginal price at zero flow;
/// 4. water-fill the trade amount across them.
///
/// The router holds no state besides its configuration, so one instance
/// can serve any number of snapshots and threads.
///
/// # Examples
///
/// ```
/// use smart_order_router::config::RouterConfig;
/// use smart_order_router::domain::{Amount, SwapSpec};
/// use smart_order_router::routing::{PoolSnapshot, Router};
///
/// let json = r#"[{
///     "id": "ab", "poolType": "Weighted", "swapFee": "0",
///     "tokens": [
///         {"address": "0x0101010101010101010101010101010101010101", "balance": "1000", "decimals": 18, "weight": "0.5"},
///         {"address": "0x0202020202020202020202020202020202020202", "balance": "1000", "decimals": 18, "weight": "0.5"}
///     ]
/// }]"#;
/// let snapshot = PoolSnapshot::from_json(json).expect("valid dump");
/// let router = Router::new(RouterConfig::default()).expect("valid config");
///
/// let a = "0x0101010101010101010101010101010101010101".parse().expect("address");
/// let b = "0x0202020202020202020202020202020202020202".parse().expect("address");
/// let spec = SwapSpec::exact_in(Amount::from_u128(10_000_000_000_000_000_000)).expect("non-zero");
///
/// let route = router.route(&snapshot, a, b, spec).expect("route");
/// assert_eq!(route.paths.len(), 1);
/// assert!(route.return_amount > Amount::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    config: RouterConfig,
    ctx: MathContext,
    params: AllocatorParams,
}

impl Router {
    /// Validates `config` and derives the math context and allocator
    /// parameters from it.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] for an invalid config.
    pub fn new(config: RouterConfig) -> Result<Self> {
        config.validate()?;
        let ctx = config.math_context()?;
        let params = AllocatorParams::from_config(&config)?;
        tracing::debug!(
            max_pools = config.max_pools,
            max_hops = config.max_hops,
            price_tolerance = %params.price_tolerance,
            negligible_fraction = %params.negligible_fraction,
            "router configured"
        );
        Ok(Self {
            config,
            ctx,
            params,
        })
    }

    /// The configuration this router was built from.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The math context handed to every pool evaluation.
    #[must_use]
    pub const fn context(&self) -> &MathContext {
        &self.ctx
    }

    /// Routes the full amount of `spec` from `token_in` to `token_out`.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidInput`] for equal or unknown tokens.
    /// - [`RouterError::NoPathFound`] if the tokens are not connected
    ///   within `max_hops`.
    /// - [`RouterError::InsufficientLiquidity`] if the usable paths cannot
    ///   absorb the amount.
    /// - [`RouterError::AllocationIncomplete`] if the allocator hits its
    ///   round cap.
    /// - Non-recoverable pool errors such as [`RouterError::Overflow`].
    #[tracing::instrument(
        skip(self, snapshot),
        fields(swap_type = %spec.swap_type(), amount = %spec.amount()),
        err
    )]
    pub fn route(
        &self,
        snapshot: &PoolSnapshot,
        token_in: TokenId,
        token_out: TokenId,
        spec: SwapSpec,
    ) -> Result<RouteResult> {
        let paths = self.usable_paths(snapshot, token_in, token_out, spec)?;
        let limits: Vec<Amount> = paths.iter().map(|p| p.limit).collect();
        let allocation = allocate(
            spec.swap_type(),
            spec.amount(),
            &limits,
            &self.params,
            |i, amount| self.quote(snapshot, &paths, spec.swap_type(), i, amount),
        )?;
        let route = self.assemble(snapshot, token_in, token_out, spec, &paths, &allocation)?;
        tracing::info!(
            paths = route.paths.len(),
            return_amount = %route.return_amount,
            "route computed"
        );
        Ok(route)
    }

    /// Routes as much of `spec` as the paths absorb, returning the route
    /// for the placed amount together with the unplaced shortfall.
    ///
    /// # Errors
    ///
    /// As [`route`](Self::route), except that
    /// [`RouterError::InsufficientLiquidity`] is only returned when nothing
    /// can be placed at all.
    #[tracing::instrument(
        skip(self, snapshot),
        fields(swap_type = %spec.swap_type(), amount = %spec.amount()),
        err
    )]
    pub fn route_best_effort(
        &self,
        snapshot: &PoolSnapshot,
        token_in: TokenId,
        token_out: TokenId,
        spec: SwapSpec,
    ) -> Result<(RouteResult, Amount)> {
        let paths = self.usable_paths(snapshot, token_in, token_out, spec)?;
        let limits: Vec<Amount> = paths.iter().map(|p| p.limit).collect();
        let (allocation, shortfall) = allocate_partial(
            spec.swap_type(),
            spec.amount(),
            &limits,
            &self.params,
            |i, amount| self.quote(snapshot, &paths, spec.swap_type(), i, amount),
        )?;
        let placed = SwapSpec::new(spec.swap_type(), Amount::new(allocation.placed()))?;
        let route = self.assemble(snapshot, token_in, token_out, placed, &paths, &allocation)?;
        if !shortfall.is_zero() {
            tracing::warn!(%shortfall, "route covers only part of the amount");
        }
        Ok((route, shortfall))
    }

    /// Proposed paths with a non-zero limit, best marginal price first.
    fn usable_paths(
        &self,
        snapshot: &PoolSnapshot,
        token_in: TokenId,
        token_out: TokenId,
        spec: SwapSpec,
    ) -> Result<Vec<LimitedPath>> {
        let candidates = propose_paths(
            snapshot,
            &self.ctx,
            token_in,
            token_out,
            self.config.max_pools,
            self.config.max_hops,
        )?;
        let limited = compute_limits(
            candidates.into_iter().map(|c| c.path).collect(),
            snapshot,
            &self.ctx,
            spec.swap_type(),
        )?;

        let mut priced = Vec::with_capacity(limited.len());
        for path in limited {
            match path.path.spot_price(snapshot, &self.ctx) {
                Ok(price) => priced.push((price, path)),
                Err(e) if e.is_recoverable_for_path() => {
                    tracing::warn!(path = %path.path, error = %e, "path dropped: no spot price");
                }
                Err(e) => return Err(e),
            }
        }
        priced.sort_by(|(a, _), (b, _)| a.cmp(b));

        if priced.is_empty() {
            return Err(RouterError::InsufficientLiquidity {
                requested: spec.amount().get(),
                available: U256::ZERO,
            });
        }
        tracing::debug!(paths = priced.len(), "paths usable");
        Ok(priced.into_iter().map(|(_, p)| p).collect())
    }

    fn quote(
        &self,
        snapshot: &PoolSnapshot,
        paths: &[LimitedPath],
        swap_type: SwapType,
        index: usize,
        amount: Amount,
    ) -> Result<Amount> {
        let path = &paths
            .get(index)
            .ok_or(RouterError::InvalidInput("path index out of range"))?
            .path;
        match swap_type {
            SwapType::ExactIn => path.out_given_in(snapshot, &self.ctx, amount),
            SwapType::ExactOut => path.in_given_out(snapshot, &self.ctx, amount),
        }
    }

    fn assemble(
        &self,
        snapshot: &PoolSnapshot,
        token_in: TokenId,
        token_out: TokenId,
        spec: SwapSpec,
        paths: &[LimitedPath],
        allocation: &Allocation,
    ) -> Result<RouteResult> {
        let decimals_in = snapshot.decimals_of(token_in)?;
        let decimals_out = snapshot.decimals_of(token_out)?;
        let swap_type = spec.swap_type();

        let mut used = Vec::new();
        let mut market_spot_price: Option<Price> = None;
        for ((limited, amount), result) in paths
            .iter()
            .zip(&allocation.amounts)
            .zip(&allocation.returns)
        {
            if amount.is_zero() {
                continue;
            }
            let (paid, received) = match swap_type {
                SwapType::ExactIn => (*amount, *result),
                SwapType::ExactOut => (*result, *amount),
            };
            let effective_price = Price::from_amounts(
                Amount::new(decimals_in.upscale(paid.get())?),
                Amount::new(decimals_out.upscale(received.get())?),
                Rounding::Up,
            )?;
            let spot = limited.path.spot_price(snapshot, &self.ctx)?;
            market_spot_price = Some(market_spot_price.map_or(spot, |p| p.min(spot)));
            used.push(PathAllocation {
                path: limited.path.clone(),
                amount: *amount,
                result: *result,
                effective_price,
            });
        }

        let return_amount = Amount::new(allocation.total_return());
        let hops = used.iter().map(|p| p.path.len()).sum::<usize>();
        let swap_cost = self
            .config
            .swap_cost_per_hop
            .safe_mul(&Amount::new(U256::from(hops)))?;
        let return_amount_considering_fees = match swap_type {
            SwapType::ExactIn => return_amount.checked_sub(&swap_cost).unwrap_or(Amount::ZERO),
            SwapType::ExactOut => return_amount.safe_add(&swap_cost)?,
        };

        Ok(RouteResult {
            swap_type,
            token_in,
            token_out,
            swap_amount: spec.amount(),
            paths: used,
            return_amount,
            return_amount_considering_fees,
            market_spot_price: market_spot_price.unwrap_or(Price::ZERO),
        })
    }
}

#[cfg(all(test, feature = "all-pools"))]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::pools::state::tests::tok;
    use crate::routing::snapshot::tests::{weighted, E18};

    fn t(b: u8) -> TokenId {
        tok(b, 18).id()
    }

    fn router(config: RouterConfig) -> Router {
        let Ok(r) = Router::new(config) else {
            panic!("valid config");
        };
        r
    }

    fn exact_in(amount: u128) -> SwapSpec {
        let Ok(s) = SwapSpec::exact_in(Amount::from_u128(amount)) else {
            panic!("valid spec");
        };
        s
    }

    fn twin_pools() -> PoolSnapshot {
        let Ok(s) = PoolSnapshot::new(vec![
            weighted("p1", 1, 2, 1_000 * E18, 1_000 * E18, 0),
            weighted("p2", 1, 2, 1_000 * E18, 1_000 * E18, 0),
        ]) else {
            panic!("valid snapshot");
        };
        s
    }

    #[test]
    fn splits_across_twin_pools() {
        let r = router(RouterConfig::default());
        let Ok(route) = r.route(&twin_pools(), t(1), t(2), exact_in(100 * E18)) else {
            panic!("expected route");
        };
        assert_eq!(route.paths.len(), 2);
        let placed = route
            .paths
            .iter()
            .fold(U256::ZERO, |acc, p| acc + p.amount.get());
        assert_eq!(placed, U256::from(100 * E18));
        assert!(route.return_amount > Amount::from_u128(95 * E18));
        assert_eq!(route.market_spot_price, Price::ONE);
        assert_eq!(route.return_amount_considering_fees, route.return_amount);
    }

    #[test]
    fn swap_cost_is_netted_per_hop() {
        let config = RouterConfig {
            swap_cost_per_hop: Amount::from_u128(E18),
            ..RouterConfig::default()
        };
        let Ok(route) = router(config).route(&twin_pools(), t(1), t(2), exact_in(100 * E18))
        else {
            panic!("expected route");
        };
        assert_eq!(route.hop_count(), 2);
        assert_eq!(
            route.return_amount_considering_fees.get(),
            route.return_amount.get() - U256::from(2 * E18)
        );
    }

    #[test]
    fn exact_out_pays_at_least_spot() {
        let r = router(RouterConfig::default());
        let Ok(spec) = SwapSpec::exact_out(Amount::from_u128(50 * E18)) else {
            panic!("valid spec");
        };
        let Ok(route) = r.route(&twin_pools(), t(1), t(2), spec) else {
            panic!("expected route");
        };
        assert_eq!(route.swap_type, SwapType::ExactOut);
        assert!(route.return_amount > Amount::from_u128(50 * E18));
        assert!(route.paths.iter().all(|p| p.effective_price > Price::ONE));
    }

    #[test]
    fn best_effort_reports_shortfall() {
        let r = router(RouterConfig::default());
        // Each twin accepts 300 A.
        let Ok((route, shortfall)) =
            r.route_best_effort(&twin_pools(), t(1), t(2), exact_in(1_000 * E18))
        else {
            panic!("expected partial route");
        };
        assert_eq!(route.swap_amount, Amount::from_u128(600 * E18));
        assert_eq!(shortfall, Amount::from_u128(400 * E18));
        assert!(matches!(
            r.route(&twin_pools(), t(1), t(2), exact_in(1_000 * E18)),
            Err(RouterError::InsufficientLiquidity { .. })
        ));
    }
}
