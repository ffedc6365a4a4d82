//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use smart_order_router::prelude::*;
//! ```
//!
//! Brings the domain types, the pool capability trait, configuration,
//! errors and the routing entry points into scope in one import.

pub use crate::domain::{
    Amount, Decimals, PoolId, PoolKind, Price, Ratio, Rounding, SwapSpec, SwapType, Token, TokenId,
};

pub use crate::traits::{FromConfig, PoolMath};

pub use crate::math::CheckedArithmetic;

pub use crate::config::{PoolConfig, RouterConfig};

pub use crate::error::{Result, RouterError};

pub use crate::factory::{DefaultPoolFactory, PoolRecord};

pub use crate::pools::{MathContext, PoolBox};

pub use crate::routing::{Path, PathAllocation, PoolSnapshot, RouteResult, Router};
