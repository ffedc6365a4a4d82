//! Three-asset concentrated liquidity pool.
//!
//! Liquidity for all three pairs is concentrated on the price range
//! `[α, 1/α]`.  The pool is parameterized by `r = ∛α` and its invariant
//! `L` is the largest root of
//!
//! ```text
//! L³ = (x + L·r)(y + L·r)(z + L·r)
//! ```
//!
//! which expands to the cubic
//!
//! ```text
//! f(L) = (1 − α)·L³ − r²·(x+y+z)·L² − r·(xy+xz+yz)·L − xyz = 0
//! ```
//!
//! # Invariant Solve
//!
//! There is no closed form in general.  The solve starts above the local
//! minimum of `f` and runs Newton steps under the configured
//! [`NewtonPolicy`](crate::math::NewtonPolicy), so iterates approach the
//! root from above.  The `L³` term uses the overflow-safe split cube for
//! large invariants.
//!
//! For equal balances `b` the root is `L = b / (1 − r)`.
//!
//! # Swaps
//!
//! Swaps are constant-product trades on virtual reserves
//! `bᵢ + L·r`.  The virtual offset is nudged up on the input side and
//! down on the output side so rounding favours the pool.

use alloy_primitives::U256;

use super::{MathContext, PoolState};
use crate::config::ThreeClpConfig;
use crate::domain::{Amount, PoolId, PoolKind, Price, Ratio, Rounding, Token, TokenId};
use crate::error::{Result, RouterError};
use crate::math::constants::SAFE_LARGE_POW3_THRESHOLD;
use crate::math::fixed_point::{
    complement, div_down, div_up, mul_down, mul_up, naive_pow3_down, sqrt, wide_mul_div_down,
    ONE,
};
use crate::math::{NewtonPolicy, NewtonSolution, NewtonStep};
use crate::traits::{FromConfig, PoolMath};

const THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

fn add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b)
        .ok_or(RouterError::Overflow("three-clp addition"))
}

fn sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b)
        .ok_or(RouterError::Underflow("three-clp subtraction"))
}

fn mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b)
        .ok_or(RouterError::Overflow("three-clp multiplication"))
}

/// `x · r³`, rounded down one factor at a time.
fn times_alpha(x: U256, root3_alpha: U256) -> Result<U256> {
    mul_down(mul_down(mul_down(x, root3_alpha)?, root3_alpha)?, root3_alpha)
}

// ---------------------------------------------------------------------------
// Cubic
// ---------------------------------------------------------------------------

/// Coefficients of `f(L) = a·L³ − mb·L² − mc·L − md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubicTerms {
    /// `1 − α`.
    pub a: U256,
    /// `r² · (x + y + z)`.
    pub mb: U256,
    /// `r · (xy + xz + yz)`.
    pub mc: U256,
    /// `x · y · z`.
    pub md: U256,
}

impl CubicTerms {
    /// Coefficients for the upscaled `balances`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Overflow`] if a product exceeds 256 bits.
    pub fn new(balances: [U256; 3], root3_alpha: U256) -> Result<Self> {
        let [x, y, z] = balances;
        let alpha = times_alpha(ONE, root3_alpha)?;
        let sum = add(add(x, y)?, z)?;
        let mb = mul_down(mul_down(sum, root3_alpha)?, root3_alpha)?;
        let xy = mul_down(x, y)?;
        let pairs = add(add(xy, mul_down(x, z)?)?, mul_down(y, z)?)?;
        let mc = mul_down(pairs, root3_alpha)?;
        let md = mul_down(xy, z)?;
        Ok(Self {
            a: complement(alpha),
            mb,
            mc,
            md,
        })
    }

    /// Starting estimate above the local minimum of `f`.
    ///
    /// The minimum sits at `(mb + √(mb² + 3·a·mc)) / (3a)`; the guess is
    /// 1.5× that for `α ≥ ½` and 2× below.
    ///
    /// # Errors
    ///
    /// [`RouterError::DivisionByZero`] for `α = 1`; otherwise overflow.
    pub fn initial_guess(&self) -> Result<U256> {
        let three_a = mul(self.a, THREE)?;
        let radicand = add(
            mul_up(self.mb, self.mb)?,
            mul_up(mul_up(self.a, self.mc)?, mul(ONE, THREE)?)?,
        )?;
        let local_min = add(
            div_up(self.mb, three_a)?,
            div_up(sqrt(radicand, Rounding::Up)?, three_a)?,
        )?;
        let factor = if complement(self.a) >= ONE / U256::from(2u8) {
            ONE + ONE / U256::from(2u8)
        } else {
            ONE * U256::from(2u8)
        };
        mul_up(local_min, factor)
    }

    /// Newton step `−f(L) / f'(L)` at `invariant`.
    ///
    /// # Errors
    ///
    /// [`RouterError::Underflow`] if `f'(L)` is not positive, otherwise
    /// overflow.
    pub fn step(&self, invariant: U256, root3_alpha: U256) -> Result<NewtonStep> {
        let l = invariant;
        let three_l_squared = mul_down(mul(l, THREE)?, l)?;
        let derivative = sub(
            sub(
                sub(three_l_squared, times_alpha(three_l_squared, root3_alpha)?)?,
                mul(mul_down(l, self.mb)?, U256::from(2u8))?,
            )?,
            self.mc,
        )?;
        if derivative.is_zero() {
            return Err(RouterError::DivisionByZero);
        }

        let minus = pow3_times_a_div(l, root3_alpha, derivative)?;
        let quadratic = add(mul_down(mul_down(l, l)?, self.mb)?, mul_down(l, self.mc)?)?;
        let plus = add(div_down(quadratic, derivative)?, div_down(self.md, derivative)?)?;
        Ok(NewtonStep::between(minus, plus))
    }
}

/// `L³ · (1 − α) / d`. Above [`SAFE_LARGE_POW3_THRESHOLD`] the reduced
/// square is multiplied by `L` in 512 bits before dividing by `d`.
fn pow3_times_a_div(l: U256, root3_alpha: U256, d: U256) -> Result<U256> {
    if l <= SAFE_LARGE_POW3_THRESHOLD {
        let cube = naive_pow3_down(l)?;
        let reduced = sub(cube, times_alpha(cube, root3_alpha)?)?;
        return div_down(reduced, d);
    }
    let squared = mul_down(l, l)?;
    let reduced = sub(squared, times_alpha(squared, root3_alpha)?)?;
    wide_mul_div_down(reduced, l, d)
}

/// Invariant of the upscaled `balances` from the default start.
///
/// # Errors
///
/// - [`RouterError::DidNotConverge`] if the policy cap is reached.
/// - Overflow and underflow from the cubic terms.
pub fn calc_invariant(balances: [U256; 3], root3_alpha: U256, policy: &NewtonPolicy) -> Result<NewtonSolution> {
    let terms = CubicTerms::new(balances, root3_alpha)?;
    let initial = terms.initial_guess()?;
    policy.solve(initial, "three-clp invariant", |l| terms.step(l, root3_alpha))
}

/// Invariant solved from a warm `initial` estimate.
///
/// The policy's minimum iteration count does not apply: the solve may stop
/// at the first iteration, so a converged root is returned unchanged.
///
/// # Errors
///
/// Same as [`calc_invariant`].
pub fn calc_invariant_from(
    balances: [U256; 3],
    root3_alpha: U256,
    policy: &NewtonPolicy,
    initial: U256,
) -> Result<NewtonSolution> {
    let terms = CubicTerms::new(balances, root3_alpha)?;
    policy
        .with_min_iterations(0)
        .solve(initial, "three-clp invariant", |l| terms.step(l, root3_alpha))
}

/// Virtual reserves `(in, out)` for a swap, rounded in the pool's favour.
fn virtual_reserves(balance_in: U256, balance_out: U256, offset: U256) -> Result<(U256, U256)> {
    let virtual_in = add(balance_in, mul_up(offset, add(ONE, U256::from(2u8))?)?)?;
    let virtual_out = add(balance_out, mul_down(offset, sub(ONE, U256::from(1u8))?)?)?;
    Ok((virtual_in, virtual_out))
}

/// Net output for a net input on virtual reserves, rounded down.
///
/// # Errors
///
/// Overflow from the fixed-point layer.
pub fn calc_out_given_in(balance_in: U256, balance_out: U256, offset: U256, amount_in: U256) -> Result<U256> {
    let (virtual_in, virtual_out) = virtual_reserves(balance_in, balance_out, offset)?;
    div_down(mul_down(virtual_out, amount_in)?, add(virtual_in, amount_in)?)
}

/// Net input for an exact output on virtual reserves, rounded up.
///
/// # Errors
///
/// [`RouterError::Underflow`] if the output drains the virtual reserve.
pub fn calc_in_given_out(balance_in: U256, balance_out: U256, offset: U256, amount_out: U256) -> Result<U256> {
    let (virtual_in, virtual_out) = virtual_reserves(balance_in, balance_out, offset)?;
    let remaining = sub(virtual_out, amount_out)?;
    div_up(mul_up(virtual_in, amount_out)?, remaining)
}

// ---------------------------------------------------------------------------
// ThreeClpPool
// ---------------------------------------------------------------------------

/// A three-asset concentrated liquidity pool.
///
/// Created from a [`ThreeClpConfig`] via [`FromConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeClpPool {
    state: PoolState,
    root3_alpha: U256,
}

impl FromConfig<ThreeClpConfig> for ThreeClpPool {
    fn from_config(config: &ThreeClpConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: config.state().clone(),
            root3_alpha: config.root3_alpha().get(),
        })
    }
}

impl ThreeClpPool {
    /// `∛α` in fixed point.
    #[must_use]
    pub const fn root3_alpha(&self) -> U256 {
        self.root3_alpha
    }

    /// Shared pool state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    fn balances3(&self) -> Result<[U256; 3]> {
        let balances = self.state.upscaled_balances()?;
        <[U256; 3]>::try_from(balances)
            .map_err(|_| RouterError::InvalidConfiguration("three-asset pools hold exactly 3 tokens"))
    }

    /// Invariant with the step count of the solve.
    ///
    /// # Errors
    ///
    /// Same as [`PoolMath::invariant`].
    pub fn invariant_solution(&self, ctx: &MathContext) -> Result<NewtonSolution> {
        calc_invariant(self.balances3()?, self.root3_alpha, ctx.newton())
    }

    /// Invariant solved from a caller-provided starting estimate.
    ///
    /// # Errors
    ///
    /// Same as [`PoolMath::invariant`].
    pub fn invariant_from(&self, ctx: &MathContext, initial: U256) -> Result<NewtonSolution> {
        calc_invariant_from(self.balances3()?, self.root3_alpha, ctx.newton(), initial)
    }

    /// `L · r`, the amount added to every balance to form the virtual
    /// reserves.
    fn virtual_offset(&self, ctx: &MathContext) -> Result<U256> {
        let invariant = self.invariant_solution(ctx)?.root();
        mul_down(invariant, self.root3_alpha)
    }

    fn pair_balances(&self, token_in: TokenId, token_out: TokenId) -> Result<(usize, usize, U256, U256)> {
        let (i, o) = self.state.pair(token_in, token_out)?;
        Ok((
            i,
            o,
            self.state.upscaled_balance(i)?,
            self.state.upscaled_balance(o)?,
        ))
    }
}

impl PoolMath for ThreeClpPool {
    fn id(&self) -> &PoolId {
        self.state.id()
    }

    fn kind(&self) -> PoolKind {
        PoolKind::ThreeClp
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
        let (i, o, balance_in, balance_out) = self.pair_balances(token_in, token_out)?;
        if amount_in.is_zero() {
            return Ok(Amount::ZERO);
        }
        let gross = self.state.upscale(i, amount_in)?;
        ctx.check_ratio(gross, balance_in, "three-clp amount in")?;
        let net = self.state.subtract_fee(gross)?;
        let offset = self.virtual_offset(ctx)?;
        let out = calc_out_given_in(balance_in, balance_out, offset, net)?;
        self.state.downscale(o, out, Rounding::Down)
    }

    fn in_given_out(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_out: Amount,
    ) -> Result<Amount> {
        let (i, o, balance_in, balance_out) = self.pair_balances(token_in, token_out)?;
        if amount_out.is_zero() {
            return Ok(Amount::ZERO);
        }
        let out = self.state.upscale(o, amount_out)?;
        ctx.check_ratio(out, balance_out, "three-clp amount out")?;
        let offset = self.virtual_offset(ctx)?;
        let net = calc_in_given_out(balance_in, balance_out, offset, out)?;
        let gross = self.state.add_fee(net)?;
        self.state.downscale(i, gross, Rounding::Up)
    }

    /// `(bᵢ + L·r) / (bₒ + L·r) / (1 − fee)`.
    fn spot_price(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Price> {
        let (_, _, balance_in, balance_out) = self.pair_balances(token_in, token_out)?;
        let offset = self.virtual_offset(ctx)?;
        let price = div_up(add(balance_in, offset)?, add(balance_out, offset)?)?;
        div_up(price, self.state.swap_fee().complement().get()).map(Price::from_fixed)
    }

    fn max_amount_in(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount> {
        let (i, _, balance_in, _) = self.pair_balances(token_in, token_out)?;
        self.state
            .downscale(i, ctx.ratio_cap(balance_in)?, Rounding::Down)
    }

    fn max_amount_out(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount> {
        let (_, o, _, balance_out) = self.pair_balances(token_in, token_out)?;
        self.state
            .downscale(o, ctx.ratio_cap(balance_out)?, Rounding::Down)
    }

    /// Half the virtual output reserve.
    fn normalized_liquidity(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<Amount> {
        let (_, o, _, balance_out) = self.pair_balances(token_in, token_out)?;
        let offset = self.virtual_offset(ctx)?;
        let liquidity = add(balance_out, offset)? / U256::from(2u8);
        self.state.downscale(o, liquidity, Rounding::Down)
    }
}
