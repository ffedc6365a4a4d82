//! Unified error types for the router.
//!
//! All fallible operations across the crate return [`RouterError`] as their
//! error type, so a caller can tell every failure kind apart without
//! string matching.
//!
//! # Propagation
//!
//! | Variant | Scope |
//! |---------|-------|
//! | [`InvalidInput`](RouterError::InvalidInput), [`NoPathFound`](RouterError::NoPathFound) | Reported immediately, never retried |
//! | [`DidNotConverge`](RouterError::DidNotConverge), [`SwapLimitExceeded`](RouterError::SwapLimitExceeded) | Invalidate only the paths using the failing pool |
//! | [`InsufficientLiquidity`](RouterError::InsufficientLiquidity) | Terminal for the requested amount |
//! | [`Overflow`](RouterError::Overflow) and friends | Terminal for the computation |

use alloy_primitives::U256;
use thiserror::Error;

/// Every failure the routing core can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Malformed token or pool reference, or a zero trade amount.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A token is not part of the pool it was used with.
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    /// A pool weight is zero or the weights do not sum to one.
    #[error("invalid weight: {0}")]
    InvalidWeight(&'static str),

    /// A token declares more decimals than the fixed-point scale supports.
    #[error("invalid precision: {0}")]
    InvalidPrecision(&'static str),

    /// A pool balance required by the math is zero.
    #[error("pool balance is zero")]
    ZeroReserve,

    /// A Newton iteration exhausted its cap without meeting the stop rule.
    #[error("iteration did not converge: {0}")]
    DidNotConverge(&'static str),

    /// The graph has no route between the tokens within the hop cap.
    #[error("no path found between the requested tokens")]
    NoPathFound,

    /// Aggregate path capacity is below the requested trade amount.
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        /// Requested trade amount.
        requested: U256,
        /// Total capacity across the usable paths.
        available: U256,
    },

    /// A single pool operation would move more than the balance-ratio limit.
    #[error("swap exceeds balance ratio limit: {0}")]
    SwapLimitExceeded(&'static str),

    /// The allocator reached its round cap before placing the full amount.
    #[error("allocation did not complete within its round cap")]
    AllocationIncomplete,

    /// An intermediate value does not fit in 256 bits.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// A subtraction would go below zero.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A pool record or configuration document could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl RouterError {
    /// Returns `true` for failures that only invalidate the path using the
    /// failing pool; the remaining candidates are still routable.
    #[must_use]
    pub const fn is_recoverable_for_path(&self) -> bool {
        matches!(self, Self::DidNotConverge(_) | Self::SwapLimitExceeded(_))
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for RouterError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, RouterError>;
