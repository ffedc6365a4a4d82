//! Uniform pricing capability implemented by every pool family.
//!
//! [`PoolMath`] is what the routing pipeline sees of a pool.  It is
//! read-only: a pool is an immutable snapshot for the duration of one
//! routing computation, and quoting a swap never mutates it.
//!
//! # Units
//!
//! Amounts crossing the trait are raw token units ([`Amount`]); the
//! implementations upscale to 18-decimal fixed point internally.  Prices
//! are 18-decimal fixed point quoted as *token in per token out*.
//!
//! # Fee Deduction Invariant
//!
//! All implementations deduct the fee from the input amount before the
//! pricing curve is applied:
//!
//! ```text
//! net_input  = amount_in − ⌈amount_in × fee⌉
//! amount_out = curve(net_input)
//! ```
//!
//! and, for exact-output quotes, gross the curve's input back up:
//!
//! ```text
//! amount_in = ⌈curve⁻¹(amount_out) / (1 − fee)⌉
//! ```
//!
//! # Balance-ratio rule
//!
//! A single operation may not take in more than
//! [`balance_ratio_limit`](crate::pools::MathContext::balance_ratio_limit)
//! of the input balance, nor pay out more than that fraction of the output
//! balance.  Violations are [`RouterError::SwapLimitExceeded`]; the
//! [`max_amount_in`](PoolMath::max_amount_in) and
//! [`max_amount_out`](PoolMath::max_amount_out) bounds are the largest
//! amounts that pass.
//!
//! # Dispatch Model
//!
//! Pools are dispatched via the `PoolBox` enum, not `dyn` trait objects.
//!
//! [`RouterError::SwapLimitExceeded`]: crate::error::RouterError::SwapLimitExceeded

use alloy_primitives::U256;

use crate::domain::{Amount, PoolId, PoolKind, Price, Ratio, Token, TokenId};
use crate::error::Result;
use crate::pools::MathContext;

/// Read-only pricing interface of a pool snapshot.
///
/// # Errors
///
/// Methods that can fail return [`Result`].  Common variants:
///
/// - `InvalidToken`: a token is not part of the pool.
/// - `ZeroReserve`: a relevant balance is zero.
/// - `SwapLimitExceeded`: the balance-ratio rule is violated.
/// - `DidNotConverge`: an iterative solve hit its cap.
/// - `Overflow`: arithmetic overflow during calculation.
pub trait PoolMath {
    /// Pool identifier.
    fn id(&self) -> &PoolId;

    /// Pool family.
    fn kind(&self) -> PoolKind;

    /// Tokens in pool order.
    fn tokens(&self) -> &[Token];

    /// Raw balances in pool order.
    fn balances(&self) -> &[Amount];

    /// Swap fee charged on the input.
    fn swap_fee(&self) -> Ratio;

    /// Whether swaps are enabled.
    fn is_enabled(&self) -> bool;

    /// The pool invariant in 18-decimal fixed point.
    ///
    /// # Errors
    ///
    /// `ZeroReserve`, `DidNotConverge` or `Overflow`.
    fn invariant(&self, ctx: &MathContext) -> Result<U256>;

    /// Output paid for an exact `amount_in`, fee included.
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `SwapLimitExceeded`, `DidNotConverge`, `Overflow`.
    fn out_given_in(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: Amount,
    ) -> Result<Amount>;

    /// Input required for an exact `amount_out`, fee included.
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `SwapLimitExceeded`, `DidNotConverge`, `Overflow`.
    fn in_given_out(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
        amount_out: Amount,
    ) -> Result<Amount>;

    /// Marginal price at the current balances, fee included, as token in
    /// per token out.
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `ZeroReserve`, `DidNotConverge`, `Overflow`.
    fn spot_price(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Price>;

    /// Largest raw input that passes the balance-ratio rule.
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `ZeroReserve`, `Overflow`.
    fn max_amount_in(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount>;

    /// Largest raw output that passes the balance-ratio rule.
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `ZeroReserve`, `Overflow`.
    fn max_amount_out(&self, ctx: &MathContext, token_in: TokenId, token_out: TokenId) -> Result<Amount>;

    /// Depth of the pair in raw output-token units, used to rank
    /// candidate pools.
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `ZeroReserve`, `Overflow`.
    fn normalized_liquidity(
        &self,
        ctx: &MathContext,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<Amount>;

    /// `true` if the pool holds `token`.
    fn contains(&self, token: TokenId) -> bool {
        self.tokens().iter().any(|t| t.id() == token)
    }
}
