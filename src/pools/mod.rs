//! Feature-gated pool implementations and the [`PoolBox`] dispatch enum.
//!
//! Each pool family is behind its own Cargo feature flag.  The
//! [`PoolBox`] enum provides zero-cost static dispatch across all enabled
//! families, allowing heterogeneous collections without `dyn` trait
//! objects.  Every family holds a [`PoolState`] snapshot and prices swaps
//! under a [`MathContext`].
//!
//! # Pool Types
//!
//! | Feature | Pool | Style |
//! |---------|------|-------|
//! | `weighted` | [`WeightedPool`] | Balancer weighted |
//! | `stable` | [`StablePool`] | Curve StableSwap |
//! | `three-clp` | [`ThreeClpPool`] | Three-asset concentrated liquidity |

mod context;
pub mod state;

#[cfg(feature = "stable")]
pub mod stable;
#[cfg(feature = "three-clp")]
pub mod three_clp;
#[cfg(feature = "weighted")]
pub mod weighted;

mod pool_box;

#[cfg(all(test, feature = "all-pools"))]
#[allow(clippy::panic)]
mod proptest_properties;

pub use context::MathContext;
pub use pool_box::PoolBox;
#[cfg(feature = "stable")]
pub use stable::StablePool;
pub use state::PoolState;
#[cfg(feature = "three-clp")]
pub use three_clp::ThreeClpPool;
#[cfg(feature = "weighted")]
pub use weighted::WeightedPool;
