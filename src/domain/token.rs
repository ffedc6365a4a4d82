//! Token identity type.

use serde::{Deserialize, Serialize};

use super::{Decimals, TokenId};

/// A token as the router sees it: identifier plus decimal precision.
///
/// The decimals drive the scaling of raw balances and amounts into
/// 18-decimal fixed point.
///
/// # Examples
///
/// ```
/// use smart_order_router::domain::{Decimals, Token, TokenId};
///
/// let id  = TokenId::from_bytes([1u8; 20]);
/// let dec = Decimals::new(6).expect("valid");
/// let tok = Token::new(id, dec);
///
/// assert_eq!(tok.id(), id);
/// assert_eq!(tok.decimals(), dec);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    id: TokenId,
    decimals: Decimals,
}

impl Token {
    /// Creates a new `Token`.
    #[must_use]
    pub const fn new(id: TokenId, decimals: Decimals) -> Self {
        Self { id, decimals }
    }

    /// Returns the token identifier.
    #[must_use]
    pub const fn id(&self) -> TokenId {
        self.id
    }

    /// Returns the token decimals.
    #[must_use]
    pub const fn decimals(&self) -> Decimals {
        self.decimals
    }
}
