//! Snapshot state shared by every pool family.

use alloy_primitives::U256;

use crate::domain::{Amount, PoolId, Ratio, Rounding, Token, TokenId};
use crate::error::{Result, RouterError};
use crate::math::fixed_point::{div_up, mul_up};

/// Immutable pool snapshot: identity, tokens, raw balances and fee.
///
/// Balances are kept in each token's native decimals.  The pool families
/// upscale them to 18-decimal fixed point through
/// [`upscaled_balance`](Self::upscaled_balance) and convert results back
/// with [`downscale`](Self::downscale): outputs round down, inputs round up.
///
/// # Validation
///
/// - At least 2 tokens, one balance per token.
/// - No duplicate token ids.
///
/// Zero balances are representable; such pools are excluded from routing
/// by the snapshot and fail with [`RouterError::ZeroReserve`] in the math.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    id: PoolId,
    tokens: Vec<Token>,
    balances: Vec<Amount>,
    swap_fee: Ratio,
    enabled: bool,
}

impl PoolState {
    /// Creates an enabled pool state.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidConfiguration`] if fewer than 2 tokens are
    ///   given or the balance count differs from the token count.
    /// - [`RouterError::InvalidToken`] on duplicate token ids.
    pub fn new(id: PoolId, tokens: Vec<Token>, balances: Vec<Amount>, swap_fee: Ratio) -> Result<Self> {
        if tokens.len() < 2 {
            return Err(RouterError::InvalidConfiguration(
                "at least 2 tokens are required",
            ));
        }
        if tokens.len() != balances.len() {
            return Err(RouterError::InvalidConfiguration(
                "tokens and balances must have equal length",
            ));
        }
        let mut iter = tokens.iter();
        while let Some(token) = iter.next() {
            if iter.clone().any(|other| other.id() == token.id()) {
                return Err(RouterError::InvalidToken("duplicate token in pool"));
            }
        }
        Ok(Self {
            id,
            tokens,
            balances,
            swap_fee,
            enabled: true,
        })
    }

    /// Returns a copy with swaps enabled or disabled.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Pool identifier.
    #[must_use]
    pub const fn id(&self) -> &PoolId {
        &self.id
    }

    /// Pool tokens in pool order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Raw balances in pool order.
    #[must_use]
    pub fn balances(&self) -> &[Amount] {
        &self.balances
    }

    /// Swap fee charged on the input amount.
    #[must_use]
    pub const fn swap_fee(&self) -> Ratio {
        self.swap_fee
    }

    /// Whether swaps are enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `true` if any balance is zero.
    #[must_use]
    pub fn has_zero_balance(&self) -> bool {
        self.balances.iter().any(Amount::is_zero)
    }

    /// Position of `token` in the pool.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidToken`] if the pool does not hold it.
    pub fn index_of(&self, token: TokenId) -> Result<usize> {
        self.tokens
            .iter()
            .position(|t| t.id() == token)
            .ok_or(RouterError::InvalidToken("token is not part of the pool"))
    }

    /// Positions of a swap's input and output tokens.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidToken`] if either token is missing.
    /// - [`RouterError::InvalidInput`] if both are the same token.
    pub fn pair(&self, token_in: TokenId, token_out: TokenId) -> Result<(usize, usize)> {
        if token_in == token_out {
            return Err(RouterError::InvalidInput("token in and token out are equal"));
        }
        Ok((self.index_of(token_in)?, self.index_of(token_out)?))
    }

    /// Token at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidToken`] if out of range.
    pub fn token(&self, index: usize) -> Result<&Token> {
        self.tokens
            .get(index)
            .ok_or(RouterError::InvalidToken("token index out of range"))
    }

    /// Balance at `index` in 18-decimal fixed point.
    ///
    /// # Errors
    ///
    /// - [`RouterError::ZeroReserve`] if the balance is zero.
    /// - [`RouterError::Overflow`] if upscaling overflows.
    pub fn upscaled_balance(&self, index: usize) -> Result<U256> {
        let balance = self
            .balances
            .get(index)
            .ok_or(RouterError::InvalidToken("token index out of range"))?;
        if balance.is_zero() {
            return Err(RouterError::ZeroReserve);
        }
        self.upscale(index, *balance)
    }

    /// All balances in 18-decimal fixed point.
    ///
    /// # Errors
    ///
    /// Same as [`upscaled_balance`](Self::upscaled_balance).
    pub fn upscaled_balances(&self) -> Result<Vec<U256>> {
        (0..self.balances.len())
            .map(|i| self.upscaled_balance(i))
            .collect()
    }

    /// Converts a raw amount of the token at `index` to fixed point.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidToken`] or [`RouterError::Overflow`].
    pub fn upscale(&self, index: usize, amount: Amount) -> Result<U256> {
        self.token(index)?.decimals().upscale(amount.get())
    }

    /// Converts a fixed-point value back to raw units of the token at
    /// `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidToken`] if out of range.
    pub fn downscale(&self, index: usize, value: U256, rounding: Rounding) -> Result<Amount> {
        self.token(index)?
            .decimals()
            .downscale(value, rounding)
            .map(Amount::new)
    }

    /// Input amount net of the swap fee: `a − ⌈a · fee⌉`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Overflow`] if `a · fee` overflows.
    pub fn subtract_fee(&self, amount: U256) -> Result<U256> {
        let fee = mul_up(amount, self.swap_fee.get())?;
        amount
            .checked_sub(fee)
            .ok_or(RouterError::Underflow("fee exceeds amount"))
    }

    /// Gross input whose net of fee is `amount`: `⌈a / (1 − fee)⌉`.
    ///
    /// # Errors
    ///
    /// - [`RouterError::DivisionByZero`] for a 100% fee.
    /// - [`RouterError::Overflow`] if the result overflows.
    pub fn add_fee(&self, amount: U256) -> Result<U256> {
        div_up(amount, self.swap_fee.complement().get())
    }
}
