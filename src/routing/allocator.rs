//! Water-filling allocation of a trade across paths.
//!
//! The total is split into `steps` equal increments.  Each round hands the
//! next increment (or what is left of a path's limit, if smaller) to the
//! path with the best marginal rate at its current allocation:
//!
//! | Swap type | Rate | Best |
//! |-----------|------|------|
//! | exact-in  | extra output per unit of input | highest |
//! | exact-out | extra input per unit of output | lowest |
//!
//! Rates are compared by cross-multiplication, never by division.  A path
//! that carries nothing yet is charged `price_tolerance` extra, so flow
//! stays on already-used paths unless a fresh one is clearly better, and
//! no more than `max_paths` paths are ever used together.
//!
//! Once the total is placed, paths below `negligible_fraction` of it are
//! dropped and their share handed to the remaining paths.  Finally the
//! blend is compared against routing everything through the single best
//! path, and the better of the two wins.
//!
//! The allocator only sees path indices, limits and a quote function, so
//! it is independent of the pool math.

use alloy_primitives::U256;

use crate::config::RouterConfig;
use crate::domain::{Amount, Ratio, Rounding, SwapType};
use crate::error::{Result, RouterError};
use crate::math::CheckedArithmetic;

/// Allocator tuning, derived from [`RouterConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorParams {
    /// Increments the total is split into.
    pub steps: u32,
    /// Most paths used at once.
    pub max_paths: usize,
    /// Marginal-rate handicap of a path that carries nothing yet.
    pub price_tolerance: Ratio,
    /// Share of the total below which a path is dropped.
    pub negligible_fraction: Ratio,
}

impl AllocatorParams {
    /// Extracts the allocator knobs.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] for out-of-range
    /// fractions.
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        Ok(Self {
            steps: config.allocation_steps,
            max_paths: config.max_pools,
            price_tolerance: config.price_tolerance()?,
            negligible_fraction: config.negligible_fraction()?,
        })
    }
}

impl Default for AllocatorParams {
    fn default() -> Self {
        Self {
            steps: 100,
            max_paths: 4,
            price_tolerance: Ratio::ZERO,
            negligible_fraction: Ratio::ZERO,
        }
    }
}

/// Per-path amounts and the quotes they produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Amount of the fixed side given to each path, in path order.
    pub amounts: Vec<Amount>,
    /// Quote for each amount: output for exact-in, input for exact-out.
    pub returns: Vec<Amount>,
}

impl Allocation {
    fn empty(n: usize) -> Self {
        Self {
            amounts: vec![Amount::ZERO; n],
            returns: vec![Amount::ZERO; n],
        }
    }

    /// Sum of the allocated amounts.
    #[must_use]
    pub fn placed(&self) -> U256 {
        self.amounts
            .iter()
            .fold(U256::ZERO, |acc, a| acc.saturating_add(a.get()))
    }

    /// Sum of the quotes.
    #[must_use]
    pub fn total_return(&self) -> U256 {
        self.returns
            .iter()
            .fold(U256::ZERO, |acc, a| acc.saturating_add(a.get()))
    }

    /// Number of paths carrying a non-zero amount.
    #[must_use]
    pub fn active_paths(&self) -> usize {
        self.amounts.iter().filter(|a| !a.is_zero()).count()
    }
}

/// Splits `total` across paths with the given `limits`.
///
/// `quote(i, amount)` evaluates path `i` for `amount` of the fixed side.
///
/// # Errors
///
/// - [`RouterError::InvalidInput`] for a zero total.
/// - [`RouterError::InsufficientLiquidity`] if the limits, or the paths
///   still evaluating, cannot absorb the total.
/// - [`RouterError::AllocationIncomplete`] if the round cap is hit.
/// - Non-recoverable errors from `quote`.
pub fn allocate<F>(
    swap_type: SwapType,
    total: Amount,
    limits: &[Amount],
    params: &AllocatorParams,
    quote: F,
) -> Result<Allocation>
where
    F: Fn(usize, Amount) -> Result<Amount>,
{
    if total.is_zero() {
        return Err(RouterError::InvalidInput("trade amount is zero"));
    }
    let available = capacity(limits);
    if total.get() > available {
        return Err(RouterError::InsufficientLiquidity {
            requested: total.get(),
            available,
        });
    }

    let filler = WaterFill {
        swap_type,
        params,
        quote: &quote,
    };
    let allocation = filler.run(total.get(), limits)?;
    let placed = allocation.placed();
    if placed < total.get() {
        return Err(RouterError::InsufficientLiquidity {
            requested: total.get(),
            available: placed,
        });
    }
    Ok(allocation)
}

/// Like [`allocate`], but places as much as the paths absorb and returns
/// the unplaced shortfall alongside the allocation.
///
/// # Errors
///
/// - [`RouterError::InvalidInput`] for a zero total.
/// - [`RouterError::InsufficientLiquidity`] if nothing at all can be
///   placed.
/// - [`RouterError::AllocationIncomplete`] and non-recoverable `quote`
///   errors, as for [`allocate`].
pub fn allocate_partial<F>(
    swap_type: SwapType,
    total: Amount,
    limits: &[Amount],
    params: &AllocatorParams,
    quote: F,
) -> Result<(Allocation, Amount)>
where
    F: Fn(usize, Amount) -> Result<Amount>,
{
    if total.is_zero() {
        return Err(RouterError::InvalidInput("trade amount is zero"));
    }
    let target = total.get().min(capacity(limits));
    let filler = WaterFill {
        swap_type,
        params,
        quote: &quote,
    };
    let allocation = if target.is_zero() {
        Allocation::empty(limits.len())
    } else {
        filler.run(target, limits)?
    };
    let placed = allocation.placed();
    if placed.is_zero() {
        return Err(RouterError::InsufficientLiquidity {
            requested: total.get(),
            available: U256::ZERO,
        });
    }
    let shortfall = total.safe_sub(&Amount::new(placed))?;
    if !shortfall.is_zero() {
        tracing::debug!(%shortfall, "partial allocation");
    }
    Ok((allocation, shortfall))
}

fn capacity(limits: &[Amount]) -> U256 {
    limits
        .iter()
        .fold(U256::ZERO, |acc, l| acc.saturating_add(l.get()))
}

// ---------------------------------------------------------------------------
// Water filling
// ---------------------------------------------------------------------------

struct WaterFill<'a, F> {
    swap_type: SwapType,
    params: &'a AllocatorParams,
    quote: &'a F,
}

/// One candidate increment.
#[derive(Clone, Copy)]
struct Increment {
    path: usize,
    amount: U256,
    delta: U256,
    quote: U256,
}

impl<F> WaterFill<'_, F>
where
    F: Fn(usize, Amount) -> Result<Amount>,
{
    fn run(&self, target: U256, limits: &[Amount]) -> Result<Allocation> {
        let mut caps: Vec<U256> = limits.iter().map(Amount::get).collect();
        let mut allocation = self.fill(target, &mut caps)?;
        if allocation.placed() < target {
            return Ok(allocation);
        }
        allocation = self.prune(target, &caps, allocation)?;
        self.against_single_path(target, &caps, allocation)
    }

    /// Greedy increments until `target` is placed or no path has room.
    /// Paths whose quote fails recoverably are capped at their current
    /// amount in `caps`.
    fn fill(&self, target: U256, caps: &mut [U256]) -> Result<Allocation> {
        let n = caps.len();
        let mut amounts = vec![U256::ZERO; n];
        let mut quotes = vec![U256::ZERO; n];
        let steps = Amount::from(u128::from(self.params.steps.max(1)));
        let step = Amount::new(target).safe_div(&steps, Rounding::Up)?.get();
        let max_rounds = u64::from(self.params.steps)
            .saturating_add(u64::try_from(n).unwrap_or(u64::MAX))
            .saturating_add(1);

        let mut placed = U256::ZERO;
        let mut rounds = 0u64;
        while placed < target {
            rounds += 1;
            if rounds > max_rounds {
                tracing::warn!(%placed, %target, rounds, "allocation round cap reached");
                return Err(RouterError::AllocationIncomplete);
            }
            let increment = step.min(target - placed);
            let active = amounts.iter().filter(|a| !a.is_zero()).count();

            let mut best: Option<Increment> = None;
            for (i, (cap, (&amount, &current))) in
                caps.iter_mut().zip(amounts.iter().zip(quotes.iter())).enumerate()
            {
                let room = cap.saturating_sub(amount);
                if room.is_zero() || (amount.is_zero() && active >= self.params.max_paths) {
                    continue;
                }
                let d = increment.min(room);
                let next = match (self.quote)(i, Amount::new(amount + d)) {
                    Ok(q) => q.get(),
                    Err(e) if e.is_recoverable_for_path() => {
                        tracing::warn!(path = i, error = %e, "path capped during allocation");
                        *cap = amount;
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                let delta = self.handicap(next.saturating_sub(current), amount.is_zero())?;
                let candidate = Increment {
                    path: i,
                    amount: d,
                    delta,
                    quote: next,
                };
                if best.map_or(true, |b| self.better(&candidate, &b)) {
                    best = Some(candidate);
                }
            }

            let Some(chosen) = best else {
                tracing::debug!(%placed, %target, "no path has room left");
                break;
            };
            let (Some(amount), Some(quote)) =
                (amounts.get_mut(chosen.path), quotes.get_mut(chosen.path))
            else {
                break;
            };
            *amount += chosen.amount;
            *quote = chosen.quote;
            placed += chosen.amount;
            tracing::trace!(path = chosen.path, increment = %chosen.amount, "increment placed");
        }

        Ok(Allocation {
            amounts: amounts.into_iter().map(Amount::new).collect(),
            returns: quotes.into_iter().map(Amount::new).collect(),
        })
    }

    /// `a` has a strictly better marginal rate than `b`.
    fn better(&self, a: &Increment, b: &Increment) -> bool {
        let lhs = a.delta.saturating_mul(b.amount);
        let rhs = b.delta.saturating_mul(a.amount);
        match self.swap_type {
            SwapType::ExactIn => lhs > rhs,
            SwapType::ExactOut => lhs < rhs,
        }
    }

    /// Worsens the marginal change of a path that carries nothing yet.
    fn handicap(&self, delta: U256, fresh: bool) -> Result<U256> {
        let tolerance = self.params.price_tolerance;
        if !fresh || tolerance.is_zero() {
            return Ok(delta);
        }
        match self.swap_type {
            SwapType::ExactIn => tolerance.complement().apply(delta, Rounding::Down),
            SwapType::ExactOut => {
                let extra = tolerance.apply(delta, Rounding::Up)?;
                delta
                    .checked_add(extra)
                    .ok_or(RouterError::Overflow("allocation handicap"))
            }
        }
    }

    /// Drops paths below the negligible share and refills the target over
    /// the paths that remain; keeps the original if they cannot absorb it.
    fn prune(&self, target: U256, caps: &[U256], mut allocation: Allocation) -> Result<Allocation> {
        let threshold = self.params.negligible_fraction.apply(target, Rounding::Down)?;
        if threshold.is_zero() {
            return Ok(allocation);
        }
        loop {
            let negligible: Vec<usize> = allocation
                .amounts
                .iter()
                .enumerate()
                .filter(|(_, a)| !a.is_zero() && a.get() < threshold)
                .map(|(i, _)| i)
                .collect();
            if negligible.is_empty() || negligible.len() == allocation.active_paths() {
                return Ok(allocation);
            }

            let mut reduced: Vec<U256> = caps
                .iter()
                .zip(&allocation.amounts)
                .map(|(&cap, a)| if a.is_zero() { U256::ZERO } else { cap })
                .collect();
            for &i in &negligible {
                if let Some(cap) = reduced.get_mut(i) {
                    *cap = U256::ZERO;
                }
            }
            let refilled = self.fill(target, &mut reduced)?;
            if refilled.placed() < target {
                tracing::debug!(dropped = negligible.len(), "negligible paths kept: no room elsewhere");
                return Ok(allocation);
            }
            tracing::debug!(dropped = negligible.len(), "negligible paths dropped");
            allocation = refilled;
        }
    }

    /// Replaces the blend by the best single path when that is strictly
    /// better.
    fn against_single_path(&self, target: U256, caps: &[U256], blend: Allocation) -> Result<Allocation> {
        let mut best: Option<(usize, U256)> = None;
        for (i, &cap) in caps.iter().enumerate() {
            if cap < target {
                continue;
            }
            let quote = match (self.quote)(i, Amount::new(target)) {
                Ok(q) => q.get(),
                Err(e) if e.is_recoverable_for_path() => continue,
                Err(e) => return Err(e),
            };
            let improves = best.map_or(true, |(_, q)| self.prefers(quote, q));
            if improves {
                best = Some((i, quote));
            }
        }

        let Some((path, quote)) = best else {
            return Ok(blend);
        };
        if !self.prefers(quote, blend.total_return()) {
            return Ok(blend);
        }
        tracing::debug!(path, "single path beats the blend");
        let mut single = Allocation::empty(caps.len());
        if let (Some(a), Some(r)) = (single.amounts.get_mut(path), single.returns.get_mut(path)) {
            *a = Amount::new(target);
            *r = Amount::new(quote);
        }
        Ok(single)
    }

    /// `a` is a strictly better total quote than `b`.
    fn prefers(&self, a: U256, b: U256) -> bool {
        match self.swap_type {
            SwapType::ExactIn => a > b,
            SwapType::ExactOut => a < b,
        }
    }
}
