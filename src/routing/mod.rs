//! Multi-hop, multi-path trade routing.
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | snapshot | [`PoolSnapshot`] | pools indexed by id and token |
//! | proposal | [`propose_paths`] | at most `max_pools` ranked [`Path`]s |
//! | limits | [`compute_limits`] | per-path largest tradeable amount |
//! | allocation | [`allocate`] | water-filled split of the amount |
//! | assembly | [`Router`] | a [`RouteResult`] |
//!
//! [`Router`] chains the stages; each stage is also public so callers can
//! run them on their own.  Everything here is a pure function of the
//! snapshot and the configuration.

pub mod allocator;
pub mod limits;
mod path;
pub mod proposal;
mod result;
mod router;
mod snapshot;

pub use allocator::{allocate, allocate_partial, Allocation, AllocatorParams};
pub use limits::{compute_limits, path_limit, LimitedPath};
pub use path::{Hop, Path};
pub use proposal::{propose_paths, Candidate};
pub use result::{PathAllocation, RouteResult};
pub use router::Router;
pub use snapshot::PoolSnapshot;
