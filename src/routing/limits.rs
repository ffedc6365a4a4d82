//! Per-path trade limits derived from the balance-ratio rule.
//!
//! A path's limit is the largest swap amount (input for exact-in, output
//! for exact-out) for which every hop stays within its pool's
//! balance-ratio cap.  A cap deep in the path constrains the hops before
//! it, so the caps are carried through each hop's exchange function:
//!
//! - **exact-in** walks backwards, turning each hop's output cap into the
//!   input it allows;
//! - **exact-out** walks forwards, turning each hop's input cap into the
//!   output it allows.
//!
//! The candidate limit is then checked with a full evaluation and, if
//! rounding pushes it over a cap, bisected down to the largest amount that
//! evaluates.
//!
//! With the `parallel` feature the paths are evaluated on the rayon pool.

use alloy_primitives::U256;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{Path, PoolSnapshot};
use crate::domain::{Amount, SwapType};
use crate::error::{Result, RouterError};
use crate::pools::MathContext;
use crate::traits::PoolMath;

/// A path with the largest swap amount it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedPath {
    /// The path.
    pub path: Path,
    /// Largest swap amount, in the units of the fixed side of the trade.
    pub limit: Amount,
}

/// Computes the limit of every path, dropping paths whose limit is zero or
/// whose evaluation does not converge.  Order is preserved.
///
/// # Errors
///
/// Non-recoverable pool errors.
pub fn compute_limits(
    paths: Vec<Path>,
    snapshot: &PoolSnapshot,
    ctx: &MathContext,
    swap_type: SwapType,
) -> Result<Vec<LimitedPath>> {
    let evaluate = |path: Path| -> Result<Option<LimitedPath>> {
        match path_limit(&path, snapshot, ctx, swap_type) {
            Ok(limit) if limit.is_zero() => {
                tracing::debug!(%path, "path dropped: zero limit");
                Ok(None)
            }
            Ok(limit) => Ok(Some(LimitedPath { path, limit })),
            Err(e) if e.is_recoverable_for_path() => {
                tracing::warn!(%path, error = %e, "path dropped while computing limit");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    };

    #[cfg(feature = "parallel")]
    let limited: Vec<Option<LimitedPath>> =
        paths.into_par_iter().map(evaluate).collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let limited: Vec<Option<LimitedPath>> =
        paths.into_iter().map(evaluate).collect::<Result<_>>()?;

    Ok(limited.into_iter().flatten().collect())
}

/// Largest swap amount `path` accepts for `swap_type`.
///
/// # Errors
///
/// Pool errors met while walking the path.
pub fn path_limit(
    path: &Path,
    snapshot: &PoolSnapshot,
    ctx: &MathContext,
    swap_type: SwapType,
) -> Result<Amount> {
    let candidate = match swap_type {
        SwapType::ExactIn => backward_walk(path, snapshot, ctx)?,
        SwapType::ExactOut => forward_walk(path, snapshot, ctx)?,
    };
    largest_passing(candidate, |amount| evaluate(path, snapshot, ctx, swap_type, amount))
}

fn evaluate(
    path: &Path,
    snapshot: &PoolSnapshot,
    ctx: &MathContext,
    swap_type: SwapType,
    amount: Amount,
) -> Result<Amount> {
    match swap_type {
        SwapType::ExactIn => path.out_given_in(snapshot, ctx, amount),
        SwapType::ExactOut => path.in_given_out(snapshot, ctx, amount),
    }
}

/// Input limit: start from the last hop's output cap and translate each
/// allowance into the input the hop needs for it.
fn backward_walk(path: &Path, snapshot: &PoolSnapshot, ctx: &MathContext) -> Result<Amount> {
    let mut allowed_out: Option<Amount> = None;
    for hop in path.hops().iter().rev() {
        let pool = snapshot.pool(&hop.pool)?;
        let max_in = pool.max_amount_in(ctx, hop.token_in, hop.token_out)?;
        let max_out = pool.max_amount_out(ctx, hop.token_in, hop.token_out)?;
        let out = allowed_out.map_or(max_out, |a| a.min(max_out));
        let needed = match pool.in_given_out(ctx, hop.token_in, hop.token_out, out) {
            Ok(needed) => needed,
            Err(RouterError::SwapLimitExceeded(_)) => max_in,
            Err(e) => return Err(e),
        };
        allowed_out = Some(needed.min(max_in));
    }
    Ok(allowed_out.unwrap_or(Amount::ZERO))
}

/// Output limit: start from the first hop's input cap and translate each
/// allowance into the output it yields.
fn forward_walk(path: &Path, snapshot: &PoolSnapshot, ctx: &MathContext) -> Result<Amount> {
    let mut allowed_in: Option<Amount> = None;
    for hop in path.hops() {
        let pool = snapshot.pool(&hop.pool)?;
        let max_in = pool.max_amount_in(ctx, hop.token_in, hop.token_out)?;
        let max_out = pool.max_amount_out(ctx, hop.token_in, hop.token_out)?;
        let amount = allowed_in.map_or(max_in, |a| a.min(max_in));
        let produced = pool.out_given_in(ctx, hop.token_in, hop.token_out, amount)?;
        allowed_in = Some(produced.min(max_out));
    }
    Ok(allowed_in.unwrap_or(Amount::ZERO))
}

/// Largest amount `<= candidate` for which `eval` succeeds, assuming
/// success is monotone in the amount.  Zero if nothing passes.
fn largest_passing<F>(candidate: Amount, eval: F) -> Result<Amount>
where
    F: Fn(Amount) -> Result<Amount>,
{
    match eval(candidate) {
        Ok(_) => return Ok(candidate),
        Err(RouterError::SwapLimitExceeded(_)) => {}
        Err(e) => return Err(e),
    }

    let one = U256::from(1u8);
    let (mut lo, mut hi) = (U256::ZERO, candidate.get());
    while hi - lo > one {
        let mid = lo + (hi - lo) / U256::from(2u8);
        match eval(Amount::new(mid)) {
            Ok(_) => lo = mid,
            Err(RouterError::SwapLimitExceeded(_)) => hi = mid,
            Err(e) => return Err(e),
        }
    }
    tracing::trace!(candidate = %candidate, limit = %lo, "limit bisected");
    Ok(Amount::new(lo))
}

#[cfg(all(test, feature = "all-pools"))]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::PoolId;
    use crate::pools::state::tests::tok;
    use crate::routing::snapshot::tests::{weighted, E18};
    use crate::routing::Hop;

    fn hop(pool: &str, a: u8, b: u8) -> Hop {
        Hop {
            pool: PoolId::from(pool),
            token_in: tok(a, 18).id(),
            token_out: tok(b, 18).id(),
        }
    }

    fn path(hops: Vec<Hop>) -> Path {
        let Ok(p) = Path::new(hops) else {
            panic!("valid path");
        };
        p
    }

    fn snapshot() -> PoolSnapshot {
        let Ok(s) = PoolSnapshot::new(vec![
            weighted("ab", 1, 2, 1_000 * E18, 1_000 * E18, 0),
            weighted("bc", 2, 3, 100 * E18, 100 * E18, 0),
        ]) else {
            panic!("valid snapshot");
        };
        s
    }

    #[test]
    fn single_hop_limit_is_input_cap() {
        let s = snapshot();
        let ctx = MathContext::default();
        let p = path(vec![hop("ab", 1, 2)]);
        assert_eq!(
            path_limit(&p, &s, &ctx, SwapType::ExactIn),
            Ok(Amount::from_u128(300 * E18))
        );
        // What the 300 A input cap buys.
        assert_eq!(
            path_limit(&p, &s, &ctx, SwapType::ExactOut),
            Ok(Amount::from_u128(230_769_230_769_230_769_000))
        );
    }

    #[test]
    fn shallow_second_hop_constrains_first() {
        let s = snapshot();
        let ctx = MathContext::default();
        let p = path(vec![hop("ab", 1, 2), hop("bc", 2, 3)]);
        let Ok(limit) = path_limit(&p, &s, &ctx, SwapType::ExactIn) else {
            panic!("expected limit");
        };
        // bc accepts at most 30 B, which costs a little over 30 A in ab.
        assert!(limit > Amount::from_u128(30 * E18));
        assert!(limit < Amount::from_u128(31 * E18));
        assert!(p.out_given_in(&s, &ctx, limit).is_ok());
        assert!(p
            .out_given_in(&s, &ctx, Amount::from_u128(31 * E18))
            .is_err());
    }

    #[test]
    fn exact_out_limit_evaluates() {
        let s = snapshot();
        let ctx = MathContext::default();
        let p = path(vec![hop("ab", 1, 2), hop("bc", 2, 3)]);
        let Ok(limit) = path_limit(&p, &s, &ctx, SwapType::ExactOut) else {
            panic!("expected limit");
        };
        assert!(limit > Amount::ZERO);
        assert!(p.in_given_out(&s, &ctx, limit).is_ok());
    }

    #[test]
    fn bisection_finds_largest_passing_amount() {
        let cap = U256::from(1_000_003u64);
        let eval = |a: Amount| {
            if a.get() <= cap {
                Ok(a)
            } else {
                Err(RouterError::SwapLimitExceeded("test"))
            }
        };
        assert_eq!(
            largest_passing(Amount::from_u128(5_000_000), eval),
            Ok(Amount::new(cap))
        );
        assert_eq!(
            largest_passing(Amount::from_u128(10), eval),
            Ok(Amount::from_u128(10))
        );
    }

    #[test]
    fn compute_limits_keeps_order_and_drops_nothing_valid() {
        let s = snapshot();
        let paths = vec![
            path(vec![hop("bc", 2, 3)]),
            path(vec![hop("ab", 1, 2)]),
        ];
        let Ok(limited) = compute_limits(paths, &s, &MathContext::default(), SwapType::ExactIn)
        else {
            panic!("expected limits");
        };
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].limit, Amount::from_u128(30 * E18));
        assert_eq!(limited[1].limit, Amount::from_u128(300 * E18));
    }
}
