//! Pool family tag.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of pool families the router can price.
///
/// Serialized with the names used by pool snapshot dumps; the aliases
/// accept families that share the same math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    /// Balancer-style weighted pool, `∏ bᵢ^wᵢ = k`.
    #[serde(alias = "Investment", alias = "LiquidityBootstrapping")]
    Weighted,
    /// StableSwap pool with amplification.
    #[serde(alias = "MetaStable")]
    Stable,
    /// Three-asset concentrated pool with a cubic invariant.
    #[serde(rename = "Gyro3", alias = "ThreeClp")]
    ThreeClp,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weighted => write!(f, "Weighted"),
            Self::Stable => write!(f, "Stable"),
            Self::ThreeClp => write!(f, "ThreeClp"),
        }
    }
}
