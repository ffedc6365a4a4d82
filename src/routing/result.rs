//! Routing output.
//!
//! The field names and units of [`RouteResult`] are the boundary to plan
//! formatters: amounts are raw token units serialized as decimal strings,
//! prices are 18-decimal fixed point quoted as token in per token out.

use serde::{Deserialize, Serialize};

use super::Path;
use crate::domain::{Amount, Price, SwapType, TokenId};

/// Share of the trade carried by one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathAllocation {
    /// The path.
    pub path: Path,
    /// Amount of the fixed side sent through the path.
    pub amount: Amount,
    /// Output received (exact-in) or input paid (exact-out).
    pub result: Amount,
    /// Realized price of this share, token in per token out.
    pub effective_price: Price,
}

/// A complete route for one trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    /// Which side of the trade is fixed.
    pub swap_type: SwapType,
    /// Token paid.
    pub token_in: TokenId,
    /// Token received.
    pub token_out: TokenId,
    /// The fixed amount that was routed.
    pub swap_amount: Amount,
    /// Paths carrying a non-zero share, best marginal price first.
    pub paths: Vec<PathAllocation>,
    /// Total output (exact-in) or total input (exact-out).
    pub return_amount: Amount,
    /// `return_amount` with the per-hop swap cost netted: subtracted for
    /// exact-in, added for exact-out.
    pub return_amount_considering_fees: Amount,
    /// Best marginal price among the used paths before the trade.
    pub market_spot_price: Price,
}

impl RouteResult {
    /// Total hops over all used paths.
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.paths.iter().map(|p| p.path.len()).sum()
    }
}
