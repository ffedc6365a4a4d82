//! Pool and router configuration.
//!
//! [`PoolConfig`] is the declarative blueprint for one pool, with a
//! family-specific struct per variant.  [`RouterConfig`] carries the
//! tuning knobs of a routing computation.

mod pool_config;
mod router;
mod stable;
mod three_clp;
mod weighted;

pub use pool_config::PoolConfig;
pub use router::{RouterConfig, MAX_HOPS};
pub use stable::{StableConfig, MAX_AMP, MAX_STABLE_TOKENS};
pub use three_clp::ThreeClpConfig;
pub use weighted::{WeightedConfig, MAX_WEIGHTED_TOKENS, MIN_WEIGHT};
