//! Top-level pool configuration enum.
//!
//! [`PoolConfig`] is the declarative blueprint for any pool family.  Each
//! variant wraps a family-specific configuration struct holding the
//! shared [`PoolState`] plus the family parameters.
//!
//! # Factory Integration
//!
//! The factory matches on `PoolConfig` to dispatch construction:
//!
//! ```text
//! match config {
//!     PoolConfig::Weighted(cfg) => WeightedPool::from_config(&cfg),
//!     PoolConfig::Stable(cfg)   => StablePool::from_config(&cfg),
//!     PoolConfig::ThreeClp(cfg) => ThreeClpPool::from_config(&cfg),
//! }
//! ```

use super::{StableConfig, ThreeClpConfig, WeightedConfig};
use crate::domain::PoolKind;
use crate::error::Result;
use crate::pools::PoolState;

/// Configuration for any supported pool family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolConfig {
    /// Weighted pool configuration.
    Weighted(WeightedConfig),
    /// StableSwap configuration.
    Stable(StableConfig),
    /// Three-asset concentrated liquidity configuration.
    ThreeClp(ThreeClpConfig),
}

impl PoolConfig {
    /// Validates the inner configuration by delegating to the
    /// variant-specific `validate()` method.
    ///
    /// # Errors
    ///
    /// Returns the same error the inner config's `validate()` would.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Weighted(cfg) => cfg.validate(),
            Self::Stable(cfg) => cfg.validate(),
            Self::ThreeClp(cfg) => cfg.validate(),
        }
    }

    /// Shared pool state of the inner configuration.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        match self {
            Self::Weighted(cfg) => cfg.state(),
            Self::Stable(cfg) => cfg.state(),
            Self::ThreeClp(cfg) => cfg.state(),
        }
    }

    /// Pool family of the inner configuration.
    #[must_use]
    pub const fn kind(&self) -> PoolKind {
        match self {
            Self::Weighted(_) => PoolKind::Weighted,
            Self::Stable(_) => PoolKind::Stable,
            Self::ThreeClp(_) => PoolKind::ThreeClp,
        }
    }
}

impl core::fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind())
    }
}
