//! Generic construction trait for pool instantiation from configuration.
//!
//! [`FromConfig`] provides a uniform interface for creating pool instances
//! from their respective configuration structs.  Each pool family
//! implements `FromConfig<C>` for its own config, enabling the factory to
//! dispatch construction without `dyn` trait objects:
//!
//! ```text
//! PoolConfig::Weighted(cfg) => WeightedPool::from_config(&cfg)
//! PoolConfig::Stable(cfg)   => StablePool::from_config(&cfg)
//! PoolConfig::ThreeClp(cfg) => ThreeClpPool::from_config(&cfg)
//! ```
//!
//! # Validation Contract
//!
//! Implementations **must** validate all configuration invariants during
//! construction.  A successfully constructed pool is ready to quote.

use crate::error::Result;

/// Builds a pool from its configuration.
///
/// # Errors
///
/// Returns `InvalidConfiguration` (or a more specific variant) if the
/// configuration is invalid.
pub trait FromConfig<C> {
    /// Creates a new pool instance from the given configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if any pool parameter is out of range.
    /// - `InvalidToken` on duplicate tokens.
    /// - `InvalidWeight` for weights that are zero or do not sum to one.
    fn from_config(config: &C) -> Result<Self>
    where
        Self: Sized;
}
