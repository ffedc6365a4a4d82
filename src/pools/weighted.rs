//! Weighted pool implementation (Balancer style).
//!
//! Supports 2 to 8 tokens with custom weight distributions (80/20, 50/50,
//! 33/33/33, ...).
//!
//! # Invariant
//!
//! ```text
//! V = ∏ bᵢ^wᵢ        with Σ wᵢ = 1
//! ```
//!
//! # Swap Formulas
//!
//! ```text
//! out = bₒ · (1 − (bᵢ / (bᵢ + aᵢ))^(wᵢ/wₒ))
//! in  = bᵢ · ((bₒ / (bₒ − aₒ))^(wₒ/wᵢ) − 1)
//! ```
//!
//! Powers go through [`pow_up`], so the curve term is always rounded
//! against the trader.
//!
//! # Spot Price
//!
//! ```text
//! spot = (bᵢ / wᵢ) / (bₒ / wₒ) / (1 − fee)
//! ```

use alloy_primitives::U256;

use super::{MathContext, PoolState};
use crate::config::WeightedConfig;
use crate::domain::{Amount, PoolId, PoolKind, Price, Ratio, Rounding, Token, TokenId};
use crate::error::{Result, RouterError};
use crate::math::fixed_point::{
    complement, div_down, div_up, mul_div, mul_down, mul_up, pow_down, pow_up, ONE,
};
use crate::traits::{FromConfig, PoolMath};

// ---------------------------------------------------------------------------
// Weighted math
// ---------------------------------------------------------------------------

/// `∏ bᵢ^wᵢ`, every factor rounded down.
///
/// # Errors
///
/// - [`RouterError::InvalidInput`] if the slices differ in length.
/// - Overflow and domain errors from [`pow_down`].
pub fn calc_invariant(balances: &[U256], weights: &[U256]) -> Result<U256> {
    if balances.len() != weights.len() {
        return Err(RouterError::InvalidInput(
            "balances and weights must have equal length",
        ));
    }
    balances
        .iter()
        .zip(weights)
        .try_fold(ONE, |acc, (b, w)| mul_down(acc, pow_down(*b, *w)?))
}

/// Output for a net (fee-free) input amount, rounded down.
///
/// # Errors
///
/// Overflow and domain errors from the fixed-point layer.
pub fn calc_out_given_in(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_in: U256,
) -> Result<U256> {
    let denominator = balance_in
        .checked_add(amount_in)
        .ok_or(RouterError::Overflow("weighted balance in"))?;
    let base = div_up(balance_in, denominator)?;
    let exponent = div_down(weight_in, weight_out)?;
    let power = pow_up(base, exponent)?;
    mul_down(balance_out, complement(power))
}

/// Net (fee-free) input for an exact output amount, rounded up.
///
/// # Errors
///
/// - [`RouterError::Underflow`] if `amount_out` drains the balance.
/// - Overflow and domain errors from the fixed-point layer.
pub fn calc_in_given_out(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_out: U256,
) -> Result<U256> {
    let remaining = balance_out
        .checked_sub(amount_out)
        .filter(|r| !r.is_zero())
        .ok_or(RouterError::Underflow("weighted amount out drains balance"))?;
    let base = div_up(balance_out, remaining)?;
    let exponent = div_up(weight_out, weight_in)?;
    let power = pow_up(base, exponent)?;
    let ratio = power
        .checked_sub(ONE)
        .ok_or(RouterError::Underflow("weighted power below one"))?;
    mul_up(balance_in, ratio)
}

/// Spot price of `out` in units of `in`, fee included, rounded up.
///
/// # Errors
///
/// [`RouterError::DivisionByZero`] for a zero weight, balance or a 100%
/// fee; otherwise overflow.
pub fn calc_spot_price(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    swap_fee: Ratio,
) -> Result<U256> {
    let numerator = div_up(balance_in, weight_in)?;
    let denominator = div_down(balance_out, weight_out)?;
    let price = div_up(numerator, denominator)?;
    div_up(price, swap_fee.complement().get())
}

// ---------------------------------------------------------------------------
// WeightedPool
// ---------------------------------------------------------------------------

/// A Weighted AMM pool (Balancer style).
///
/// Created from a [`WeightedConfig`] via [`FromConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedPool {
    state: PoolState,
    weights: Vec<U256>,
}

impl FromConfig<WeightedConfig> for WeightedPool {
    fn from_config(config: &WeightedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: config.state().clone(),
            weights: config.weights().iter().map(Ratio::get).collect(),
        })
    }
}

impl WeightedPool {
    /// Normalized weights in pool order.
    #[must_use]
    pub fn weights(&self) -> &[U256] {
        &self.weights
    }

    /// Shared pool state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    fn weight(&self, index: usize) -> Result<U256> {
        self.weights
            .get(index)
            .copied()
            .ok_or(RouterError::InvalidToken("token index out of range"))
    }

    /// Upscaled balances and weights of a swap pair.
    fn pair_terms(&self, token_in: TokenId, token_out: TokenId) -> Result<PairTerms> {
        let (i, o) = self.state.pair(token_in, token_out)?;
        Ok(PairTerms {
            index_in: i,
            index_out: o,
            balance_in: self.state.upscaled_balance(i)?,
            weight_in: self.weight(i)?,
            balance_out: self.state.upscaled_balance(o)?,
            weight_out: self.weight(o)?,
        })
    }
}

struct PairTerms {
    index_in: usize,
    index_out: usize,
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
}

impl PoolMath for WeightedPool {
    fn id(&self) -> &PoolId {
        self.state.id()
    }

    fn kind(&self) -> PoolKind {
        PoolKind::Weighted
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

    fn invariant(&self, _ctx: &MathContext) -> Result<U256> {
        calc_invariant(&self.state.upscaled_balances()?, &self.weights)
    }

    fn out_given_in(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: Amount,
    ) -> Result<Amount> {
        let t = self.pair_terms(token_in, token_out)?;
        if amount_in.is_zero() {
            return Ok(Amount::ZERO);
        }
        let gross = self.state.upscale(t.index_in, amount_in)?;
        ctx.check_ratio(gross, t.balance_in, "weighted amount in")?;
        let net = self.state.subtract_fee(gross)?;
        let out = calc_out_given_in(t.balance_in, t.weight_in, t.balance_out, t.weight_out, net)?;
        self.state.downscale(t.index_out, out, Rounding::Down)
    }

    fn in_given_out(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_out: Amount,
    ) -> Result<Amount> {
        let t = self.pair_terms(token_in, token_out)?;
        if amount_out.is_zero() {
            return Ok(Amount::ZERO);
        }
        let out = self.state.upscale(t.index_out, amount_out)?;
        ctx.check_ratio(out, t.balance_out, "weighted amount out")?;
        let net = calc_in_given_out(t.balance_in, t.weight_in, t.balance_out, t.weight_out, out)?;
        let gross = self.state.add_fee(net)?;
        self.state.downscale(t.index_in, gross, Rounding::Up)
    }

    fn spot_price(&self, _ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Price> {
        let t = self.pair_terms(token_in, token_out)?;
        calc_spot_price(
            t.balance_in,
            t.weight_in,
            t.balance_out,
            t.weight_out,
            self.state.swap_fee(),
        )
        .map(Price::from_fixed)
    }

    fn max_amount_in(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount> {
        let t = self.pair_terms(token_in, token_out)?;
        let cap = ctx.ratio_cap(t.balance_in)?;
        self.state.downscale(t.index_in, cap, Rounding::Down)
    }

    fn max_amount_out(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount> {
        let t = self.pair_terms(token_in, token_out)?;
        let cap = ctx.ratio_cap(t.balance_out)?;
        self.state.downscale(t.index_out, cap, Rounding::Down)
    }

    /// `bₒ · wᵢ / (wᵢ + wₒ)`.
    fn normalized_liquidity(
        &self,
        _ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<Amount> {
        let t = self.pair_terms(token_in, token_out)?;
        let weight_sum = t
            .weight_in
            .checked_add(t.weight_out)
            .ok_or(RouterError::Overflow("weight sum"))?;
        let liquidity = mul_div(t.balance_out, t.weight_in, weight_sum, Rounding::Down)?;
        self.state.downscale(t.index_out, liquidity, Rounding::Down)
    }
}
