//! Core trait abstractions for pool pricing.
//!
//! [`PoolMath`] is the capability set every pool family exposes to the
//! router; [`FromConfig`] is how the factory builds each family from its
//! configuration.

mod from_config;
mod pool_math;

pub use from_config::FromConfig;
pub use pool_math::PoolMath;
