//! StableSwap pool implementation (Curve style).
//!
//! Specialised for low-slippage swaps between similarly-priced (pegged)
//! assets such as stablecoins.  Holds 2 to 5 tokens.
//!
//! # Invariant
//!
//! ```text
//! A · nⁿ · Σxᵢ + D = A · D · nⁿ + Dⁿ⁺¹ / (nⁿ · ∏xᵢ)
//! ```
//!
//! where `A` is the amplification coefficient (stored scaled by
//! [`AMP_PRECISION`]) and `D` the invariant (≈ total balance at peg).
//!
//! # Swap Algorithm
//!
//! 1. Deduct the fee from the input amount.
//! 2. Compute `D` at the current balances.
//! 3. Add the net input to the input balance.
//! 4. Solve for the output balance `y` holding `D` fixed.
//! 5. `amount_out = balance_out − y − 1`.
//!
//! Both solves are integer Newton iterations that stop when two
//! consecutive estimates differ by at most one unit, bounded by the
//! iteration cap of the [`NewtonPolicy`](crate::math::NewtonPolicy) in the
//! [`MathContext`].
//!
//! # Amplification Behaviour
//!
//! | A | Curve |
//! |---|-------|
//! | 1 | Close to constant product |
//! | 50–2 000 | Hybrid, low slippage near peg |
//! | → ∞ | Constant sum (1:1 swaps) |

use alloy_primitives::U256;

use super::{MathContext, PoolState};
use crate::config::StableConfig;
use crate::domain::{Amount, PoolId, PoolKind, Price, Ratio, Rounding, Token, TokenId};
use crate::error::{Result, RouterError};
use crate::math::constants::AMP_PRECISION;
use crate::math::fixed_point::{div_down, div_up, ONE};
use crate::math::{div_round, NewtonSolution};
use crate::traits::{FromConfig, PoolMath};

// ---------------------------------------------------------------------------
// Checked integer helpers
// ---------------------------------------------------------------------------

fn mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b)
        .ok_or(RouterError::Overflow("stable multiplication"))
}

fn add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(RouterError::Overflow("stable addition"))
}

fn sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b)
        .ok_or(RouterError::Underflow("stable subtraction"))
}

fn div(a: U256, b: U256, rounding: Rounding) -> Result<U256> {
    div_round(a, b, rounding).ok_or(RouterError::DivisionByZero)
}

fn count(balances: &[U256]) -> U256 {
    U256::from(balances.len())
}

// ---------------------------------------------------------------------------
// StableSwap math
// ---------------------------------------------------------------------------

/// Invariant `D` starting from the balance sum.
///
/// `amp` is scaled by [`AMP_PRECISION`].
///
/// # Errors
///
/// - [`RouterError::DidNotConverge`] after `max_iterations` iterations.
/// - [`RouterError::DivisionByZero`] for a zero balance.
/// - [`RouterError::Overflow`].
pub fn calc_invariant(amp: U256, balances: &[U256], max_iterations: u32) -> Result<NewtonSolution> {
    let sum = balances.iter().try_fold(U256::ZERO, |acc, b| add(acc, *b))?;
    calc_invariant_from(amp, balances, sum, max_iterations)
}

/// Invariant `D` starting from `initial`.
///
/// A converged `D` fed back as `initial` stops after one iteration.
///
/// # Errors
///
/// Same as [`calc_invariant`].
pub fn calc_invariant_from(
    amp: U256,
    balances: &[U256],
    initial: U256,
    max_iterations: u32,
) -> Result<NewtonSolution> {
    let sum = balances.iter().try_fold(U256::ZERO, |acc, b| add(acc, *b))?;
    if sum.is_zero() {
        return Ok(NewtonSolution::new(U256::ZERO, 0));
    }
    let n = count(balances);
    let amp_times_total = mul(amp, n)?;
    let mut invariant = initial;

    for iteration in 0..max_iterations {
        let d_p = d_product(balances, invariant)?;
        let previous = invariant;

        let numerator = mul(
            add(div(mul(amp_times_total, sum)?, AMP_PRECISION, Rounding::Down)?, mul(d_p, n)?)?,
            invariant,
        )?;
        let denominator = add(
            div(
                mul(sub(amp_times_total, AMP_PRECISION)?, invariant)?,
                AMP_PRECISION,
                Rounding::Down,
            )?,
            mul(add(n, U256::from(1u8))?, d_p)?,
        )?;
        invariant = div(numerator, denominator, Rounding::Down)?;

        if invariant.abs_diff(previous) <= U256::from(1u8) {
            return Ok(NewtonSolution::new(invariant, iteration + 1));
        }
    }

    tracing::warn!(max_iterations, "stable invariant iteration cap reached");
    Err(RouterError::DidNotConverge("stable invariant"))
}

/// `Dⁿ⁺¹ / (nⁿ · ∏xᵢ)`, accumulated one balance at a time.
fn d_product(balances: &[U256], invariant: U256) -> Result<U256> {
    let n = count(balances);
    balances.iter().try_fold(invariant, |acc, x| {
        div(mul(acc, invariant)?, mul(*x, n)?, Rounding::Down)
    })
}

/// Balance of the token at `index` that keeps `invariant` fixed given
/// all other `balances`.  The entry at `index` is ignored.
///
/// # Errors
///
/// - [`RouterError::DidNotConverge`] after `max_iterations` iterations.
/// - [`RouterError::DivisionByZero`] for a zero balance.
/// - [`RouterError::Overflow`] / [`RouterError::Underflow`].
pub fn calc_balance(
    amp: U256,
    balances: &[U256],
    invariant: U256,
    index: usize,
    max_iterations: u32,
) -> Result<U256> {
    let n = count(balances);
    let amp_times_total = mul(amp, n)?;
    let Some((first, rest)) = balances.split_first() else {
        return Err(RouterError::InvalidInput("stable pool has no balances"));
    };
    let current = *balances
        .get(index)
        .ok_or(RouterError::InvalidToken("token index out of range"))?;

    let mut sum = *first;
    let mut p_d = mul(*first, n)?;
    for balance in rest {
        p_d = div(mul(mul(p_d, *balance)?, n)?, invariant, Rounding::Down)?;
        sum = add(sum, *balance)?;
    }
    let sum = sub(sum, current)?;

    let invariant_squared = mul(invariant, invariant)?;
    let c = mul(
        mul(
            div(invariant_squared, mul(amp_times_total, p_d)?, Rounding::Up)?,
            AMP_PRECISION,
        )?,
        current,
    )?;
    let b = add(
        sum,
        mul(div(invariant, amp_times_total, Rounding::Down)?, AMP_PRECISION)?,
    )?;

    let mut balance = div(add(invariant_squared, c)?, add(invariant, b)?, Rounding::Up)?;
    for _ in 0..max_iterations {
        let previous = balance;
        let numerator = add(mul(balance, balance)?, c)?;
        let denominator = sub(add(mul(balance, U256::from(2u8))?, b)?, invariant)?;
        balance = div(numerator, denominator, Rounding::Up)?;
        if balance.abs_diff(previous) <= U256::from(1u8) {
            return Ok(balance);
        }
    }

    tracing::warn!(index, max_iterations, "stable balance iteration cap reached");
    Err(RouterError::DidNotConverge("stable balance"))
}

/// Net output for a net input, rounded down.
///
/// # Errors
///
/// Errors of [`calc_invariant`] and [`calc_balance`].
pub fn calc_out_given_in(
    amp: U256,
    balances: &[U256],
    index_in: usize,
    index_out: usize,
    amount_in: U256,
    max_iterations: u32,
) -> Result<U256> {
    let invariant = calc_invariant(amp, balances, max_iterations)?.root();
    let mut updated = balances.to_vec();
    let balance_in = updated
        .get_mut(index_in)
        .ok_or(RouterError::InvalidToken("token index out of range"))?;
    *balance_in = add(*balance_in, amount_in)?;
    let final_out = calc_balance(amp, &updated, invariant, index_out, max_iterations)?;
    let balance_out = *balances
        .get(index_out)
        .ok_or(RouterError::InvalidToken("token index out of range"))?;
    Ok(balance_out
        .saturating_sub(final_out)
        .saturating_sub(U256::from(1u8)))
}

/// Net input for an exact output, rounded up.
///
/// # Errors
///
/// Errors of [`calc_invariant`] and [`calc_balance`].
pub fn calc_in_given_out(
    amp: U256,
    balances: &[U256],
    index_in: usize,
    index_out: usize,
    amount_out: U256,
    max_iterations: u32,
) -> Result<U256> {
    let invariant = calc_invariant(amp, balances, max_iterations)?.root();
    let mut updated = balances.to_vec();
    let balance_out = updated
        .get_mut(index_out)
        .ok_or(RouterError::InvalidToken("token index out of range"))?;
    *balance_out = sub(*balance_out, amount_out)?;
    let final_in = calc_balance(amp, &updated, invariant, index_in, max_iterations)?;
    let balance_in = *balances
        .get(index_in)
        .ok_or(RouterError::InvalidToken("token index out of range"))?;
    add(sub(final_in, balance_in)?, U256::from(1u8))
}

/// Marginal price of `out` in units of `in`, before fees, rounded up.
///
/// The ratio of the invariant's partial derivatives:
///
/// ```text
/// (A·n + D_P / xₒ) / (A·n + D_P / xᵢ)      D_P = Dⁿ⁺¹ / (nⁿ · ∏x)
/// ```
///
/// # Errors
///
/// Errors of [`calc_invariant`]; [`RouterError::DivisionByZero`] for a
/// zero balance.
pub fn calc_spot_price(
    amp: U256,
    balances: &[U256],
    index_in: usize,
    index_out: usize,
    max_iterations: u32,
) -> Result<U256> {
    let invariant = calc_invariant(amp, balances, max_iterations)?.root();
    let d_p = d_product(balances, invariant)?;
    let amp_times_total = div(mul(mul(amp, count(balances))?, ONE)?, AMP_PRECISION, Rounding::Down)?;
    let x_in = *balances
        .get(index_in)
        .ok_or(RouterError::InvalidToken("token index out of range"))?;
    let x_out = *balances
        .get(index_out)
        .ok_or(RouterError::InvalidToken("token index out of range"))?;
    let numerator = add(amp_times_total, div_up(d_p, x_out)?)?;
    let denominator = add(amp_times_total, div_down(d_p, x_in)?)?;
    div_up(numerator, denominator)
}

// ---------------------------------------------------------------------------
// StablePool
// ---------------------------------------------------------------------------

/// A StableSwap AMM pool.
///
/// Created from a [`StableConfig`] via [`FromConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StablePool {
    state: PoolState,
    amplification: u64,
}

impl FromConfig<StableConfig> for StablePool {
    fn from_config(config: &StableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: config.state().clone(),
            amplification: config.amplification(),
        })
    }
}

impl StablePool {
    /// Unscaled amplification coefficient.
    #[must_use]
    pub const fn amplification(&self) -> u64 {
        self.amplification
    }

    /// Shared pool state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    /// Amplification scaled by [`AMP_PRECISION`].
    fn amp(&self) -> Result<U256> {
        mul(U256::from(self.amplification), AMP_PRECISION)
    }

    /// Invariant with the step count of the solve.
    ///
    /// # Errors
    ///
    /// Same as [`PoolMath::invariant`].
    pub fn invariant_solution(&self, ctx: &MathContext) -> Result<NewtonSolution> {
        calc_invariant(
            self.amp()?,
            &self.state.upscaled_balances()?,
            ctx.newton().max_iterations(),
        )
    }

    /// Invariant solved from a caller-provided starting estimate.
    ///
    /// # Errors
    ///
    /// Same as [`PoolMath::invariant`].
    pub fn invariant_from(&self, ctx: &MathContext, initial: U256) -> Result<NewtonSolution> {
        calc_invariant_from(
            self.amp()?,
            &self.state.upscaled_balances()?,
            initial,
            ctx.newton().max_iterations(),
        )
    }
}

impl PoolMath for StablePool {
    fn id(&self) -> &PoolId {
        self.state.id()
    }

    fn kind(&self) -> PoolKind {
        PoolKind::Stable
    }

    fn tokens(&self) -> &[Token] {
        self.state.tokens()
    }

    fn balances(&self) -> &[Amount] {
        self.state.balances()
    }

    fn swap_fee(&self) -> Ratio {
        self.state.swap_fee()
    }

    fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    fn invariant(&self, ctx: &MathContext) -> Result<U256> {
        self.invariant_solution(ctx).map(|s| s.root())
    }

    fn out_given_in(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: Amount,
    ) -> Result<Amount> {
        let (i, o) = self.state.pair(token_in, token_out)?;
        let balances = self.state.upscaled_balances()?;
        if amount_in.is_zero() {
            return Ok(Amount::ZERO);
        }
        let gross = self.state.upscale(i, amount_in)?;
        let balance_in = *balances
            .get(i)
            .ok_or(RouterError::InvalidToken("token index out of range"))?;
        ctx.check_ratio(gross, balance_in, "stable amount in")?;
        let net = self.state.subtract_fee(gross)?;
        let out = calc_out_given_in(self.amp()?, &balances, i, o, net, ctx.newton().max_iterations())?;
        self.state.downscale(o, out, Rounding::Down)
    }

    fn in_given_out(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_out: Amount,
    ) -> Result<Amount> {
        let (i, o) = self.state.pair(token_in, token_out)?;
        let balances = self.state.upscaled_balances()?;
        if amount_out.is_zero() {
            return Ok(Amount::ZERO);
        }
        let out = self.state.upscale(o, amount_out)?;
        let balance_out = *balances
            .get(o)
            .ok_or(RouterError::InvalidToken("token index out of range"))?;
        ctx.check_ratio(out, balance_out, "stable amount out")?;
        let net = calc_in_given_out(self.amp()?, &balances, i, o, out, ctx.newton().max_iterations())?;
        let gross = self.state.add_fee(net)?;
        self.state.downscale(i, gross, Rounding::Up)
    }

    fn spot_price(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Price> {
        let (i, o) = self.state.pair(token_in, token_out)?;
        let balances = self.state.upscaled_balances()?;
        let price = calc_spot_price(self.amp()?, &balances, i, o, ctx.newton().max_iterations())?;
        div_up(price, self.state.swap_fee().complement().get()).map(Price::from_fixed)
    }

    fn max_amount_in(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount> {
        let (i, _) = self.state.pair(token_in, token_out)?;
        let cap = ctx.ratio_cap(self.state.upscaled_balance(i)?)?;
        self.state.downscale(i, cap, Rounding::Down)
    }

    fn max_amount_out(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount> {
        let (_, o) = self.state.pair(token_in, token_out)?;
        let cap = ctx.ratio_cap(self.state.upscaled_balance(o)?)?;
        self.state.downscale(o, cap, Rounding::Down)
    }

    /// Output balance times the unscaled amplification.
    fn normalized_liquidity(
        &self,
        _ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<Amount> {
        let (_, o) = self.state.pair(token_in, token_out)?;
        let balance = self.state.upscaled_balance(o)?;
        let raw = self.state.downscale(o, balance, Rounding::Down)?;
        mul(raw.get(), U256::from(self.amplification)).map(Amount::new)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::pools::state::tests::tok;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn ratio(bps: u32) -> Ratio {
        let Ok(r) = Ratio::from_basis_points(bps) else {
            panic!("valid ratio");
        };
        r
    }

    fn pool(balances: &[u128], amp: u64, fee_bps: u32) -> StablePool {
        let tokens = (1..=balances.len())
            .map(|b| tok(u8::try_from(b).unwrap_or(0), 18))
            .collect();
        let Ok(state) = PoolState::new(
            PoolId::from("s"),
            tokens,
            balances.iter().map(|b| Amount::from_u128(*b)).collect(),
            ratio(fee_bps),
        ) else {
            panic!("valid state");
        };
        let Ok(cfg) = StableConfig::new(state, amp) else {
            panic!("valid config");
        };
        let Ok(p) = StablePool::from_config(&cfg) else {
            panic!("valid pool");
        };
        p
    }

    fn t(byte: u8) -> TokenId {
        tok(byte, 18).id()
    }

    #[test]
    fn balanced_invariant_is_sum() {
        let p = pool(&[1_000_000 * E18, 1_000_000 * E18], 100, 0);
        assert_eq!(
            p.invariant(&MathContext::default()),
            Ok(U256::from(2_000_000 * E18))
        );
    }

    #[test]
    fn unbalanced_three_token_invariant() {
        let p = pool(&[1_000_000 * E18, 1_200_000 * E18, 900_000 * E18], 100, 0);
        let Ok(inv) = p.invariant(&MathContext::default()) else {
            panic!("expected Ok");
        };
        let Ok(expected) = U256::from_str_radix("3099778671425763351467033", 10) else {
            panic!("valid literal");
        };
        assert_eq!(inv, expected);
    }

    #[test]
    fn warm_start_stops_after_one_step() {
        let p = pool(&[1_000_000 * E18, 1_200_000 * E18, 900_000 * E18], 100, 0);
        let ctx = MathContext::default();
        let Ok(first) = p.invariant_solution(&ctx) else {
            panic!("expected Ok");
        };
        let Ok(again) = p.invariant_from(&ctx, first.root()) else {
            panic!("expected Ok");
        };
        assert!(again.steps() <= 1);
        assert!(again.root().abs_diff(first.root()) <= U256::from(1u8));
    }

    #[test]
    fn near_peg_swap() {
        let p = pool(&[1_000_000 * E18, 1_000_000 * E18], 100, 0);
        let ctx = MathContext::default();
        let Ok(out) = p.out_given_in(&ctx, t(1), t(2), Amount::from_u128(1_000 * E18)) else {
            panic!("expected Ok");
        };
        assert_eq!(out, Amount::from_u128(999_990_099_098_224_001_838));
        let Ok(back) = p.in_given_out(&ctx, t(1), t(2), out) else {
            panic!("expected Ok");
        };
        assert_eq!(back, Amount::from_u128(1_000_000_000_000_000_000_832));
    }

    #[test]
    fn three_token_round_trip() {
        let p = pool(&[1_000_000 * E18, 1_200_000 * E18, 900_000 * E18], 100, 0);
        let ctx = MathContext::default();
        let Ok(out) = p.out_given_in(&ctx, t(1), t(3), Amount::from_u128(10_000 * E18)) else {
            panic!("expected Ok");
        };
        assert_eq!(out, Amount::from_u128(9_987_236_511_199_303_840_865));
        let Ok(back) = p.in_given_out(&ctx, t(1), t(3), out) else {
            panic!("expected Ok");
        };
        assert_eq!(back, Amount::from_u128(10_000_000_000_000_000_000_263));
    }

    #[test]
    fn low_amplification_has_more_slippage() {
        let ctx = MathContext::default();
        let flat = pool(&[1_000_000 * E18, 1_000_000 * E18], 100, 0);
        let curved = pool(&[1_000_000 * E18, 1_000_000 * E18], 1, 0);
        let amount = Amount::from_u128(1_000 * E18);
        let (Ok(a), Ok(b)) = (
            flat.out_given_in(&ctx, t(1), t(2), amount),
            curved.out_given_in(&ctx, t(1), t(2), amount),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(b, Amount::from_u128(999_500_249_750_249_780_952));
        assert!(a > b);
    }

    #[test]
    fn spot_price_at_peg_is_fee_only() {
        let ctx = MathContext::default();
        let p = pool(&[1_000_000 * E18, 1_000_000 * E18], 200, 0);
        assert_eq!(p.spot_price(&ctx, t(1), t(2)), Ok(Price::ONE));

        let with_fee = pool(&[1_000_000 * E18, 1_000_000 * E18], 200, 100);
        let Ok(price) = with_fee.spot_price(&ctx, t(1), t(2)) else {
            panic!("expected Ok");
        };
        let Ok(expected) = div_up(ONE, ratio(100).complement().get()) else {
            panic!("expected Ok");
        };
        assert_eq!(price.get(), expected);
    }

    #[test]
    fn scarce_output_is_more_expensive() {
        let ctx = MathContext::default();
        let p = pool(&[1_200_000 * E18, 800_000 * E18], 100, 0);
        let Ok(price) = p.spot_price(&ctx, t(1), t(2)) else {
            panic!("expected Ok");
        };
        assert!(price > Price::ONE);
        let Ok(reverse) = p.spot_price(&ctx, t(2), t(1)) else {
            panic!("expected Ok");
        };
        assert!(reverse < Price::ONE);
    }

    #[test]
    fn ratio_limit_applies() {
        let ctx = MathContext::default();
        let p = pool(&[1_000_000 * E18, 1_000_000 * E18], 100, 0);
        let Ok(max_in) = p.max_amount_in(&ctx, t(1), t(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(max_in, Amount::from_u128(300_000 * E18));
        let Ok(out) = p.out_given_in(&ctx, t(1), t(2), max_in) else {
            panic!("expected Ok");
        };
        assert_eq!(out, Amount::from_u128(299_026_254_209_235_688_600_162));
        assert_eq!(
            p.out_given_in(&ctx, t(1), t(2), Amount::from_u128(300_000 * E18 + 1)),
            Err(RouterError::SwapLimitExceeded("stable amount in"))
        );
    }

    #[test]
    fn iteration_cap_reports_did_not_converge() {
        let Ok(policy) = crate::math::NewtonPolicy::new(0, U256::from(8u8) * ONE, 1) else {
            panic!("valid policy");
        };
        let ctx = MathContext::default().with_newton(policy);
        let p = pool(&[1_000_000 * E18, 1_200_000 * E18, 900_000 * E18], 100, 0);
        assert_eq!(
            p.invariant(&ctx),
            Err(RouterError::DidNotConverge("stable invariant"))
        );
    }

    #[test]
    fn normalized_liquidity_scales_with_amp() {
        let p = pool(&[1_000 * E18, 1_000 * E18], 50, 0);
        assert_eq!(
            p.normalized_liquidity(&MathContext::default(), t(1), t(2)),
            Ok(Amount::from_u128(50_000 * E18))
        );
    }
}
