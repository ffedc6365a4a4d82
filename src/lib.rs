//! # Smart Order Router
//!
//! Splits a token trade across a graph of AMM pools: it proposes
//! single- and multi-hop paths, bounds each by the pools' balance-ratio
//! rule, and water-fills the amount across them so the blended price is
//! never worse than the best single path.
//!
//! Pool math runs in 18-decimal fixed point over `U256` and reproduces
//! the on-chain rounding of three pool families:
//!
//! - **Weighted** (Balancer style): `weighted` feature
//! - **Stable** (Curve StableSwap): `stable` feature
//! - **Three-asset concentrated liquidity** (cubic invariant): `three-clp` feature
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `parallel` | yes | Path limits evaluated on the rayon pool |
//! | `all-pools` | yes | Enables all three pool families |
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! smart-order-router = "0.1"
//! ```
//!
//! ## Route a trade over a pool dump
//!
//! ```rust
//! use smart_order_router::prelude::*;
//!
//! let json = r#"[
//!   {"id": "deep", "poolType": "Weighted", "swapFee": "0.003", "tokens": [
//!     {"address": "0x0101010101010101010101010101010101010101", "balance": "1000", "decimals": 18, "weight": "0.5"},
//!     {"address": "0x0202020202020202020202020202020202020202", "balance": "1000", "decimals": 18, "weight": "0.5"}]},
//!   {"id": "twin", "poolType": "Weighted", "swapFee": "0.003", "tokens": [
//!     {"address": "0x0101010101010101010101010101010101010101", "balance": "1000", "decimals": 18, "weight": "0.5"},
//!     {"address": "0x0202020202020202020202020202020202020202", "balance": "1000", "decimals": 18, "weight": "0.5"}]}
//! ]"#;
//!
//! // 1. Load the snapshot
//! let snapshot = PoolSnapshot::from_json(json).expect("valid dump");
//!
//! // 2. Build a router from the default configuration
//! let router = Router::new(RouterConfig::default()).expect("valid config");
//!
//! // 3. Sell 100 A for B
//! let a: TokenId = "0x0101010101010101010101010101010101010101".parse().expect("address");
//! let b: TokenId = "0x0202020202020202020202020202020202020202".parse().expect("address");
//! let spec = SwapSpec::exact_in(Amount::from_u128(100_000_000_000_000_000_000)).expect("non-zero");
//! let route = router.route(&snapshot, a, b, spec).expect("route found");
//!
//! // Two identical pools share the trade.
//! assert_eq!(route.paths.len(), 2);
//! assert!(route.return_amount > Amount::from_u128(94_000_000_000_000_000_000));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ PoolSnapshot │  PoolRecord JSON -> PoolConfig -> DefaultPoolFactory
//! └──────┬───────┘
//!        │ pools by token
//!        ▼
//! ┌──────────────┐
//! │   Proposal   │  direct + multi-hop paths, ranked, top max_pools
//! └──────┬───────┘
//!        │ Path
//!        ▼
//! ┌──────────────┐
//! │    Limits    │  balance-ratio caps carried through each hop
//! └──────┬───────┘
//!        │ LimitedPath
//!        ▼
//! ┌──────────────┐
//! │  Allocator   │  water filling on marginal rates
//! └──────┬───────┘
//!        │
//!        ▼
//!    RouteResult
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Price`](domain::Price), [`Ratio`](domain::Ratio), [`Token`](domain::Token), etc. |
//! | [`math`] | Fixed-point arithmetic, `ln`/`exp`/`pow`, Newton policy |
//! | [`traits`] | [`PoolMath`](traits::PoolMath) capability set and [`FromConfig`](traits::FromConfig) |
//! | [`config`] | [`PoolConfig`](config::PoolConfig) blueprints and [`RouterConfig`](config::RouterConfig) |
//! | [`pools`] | Feature-gated pool families and the [`PoolBox`](pools::PoolBox) dispatch enum |
//! | [`factory`] | [`DefaultPoolFactory`](factory::DefaultPoolFactory) and the [`PoolRecord`](factory::PoolRecord) dump model |
//! | [`routing`] | Snapshot, proposal, limits, allocation and the [`Router`](routing::Router) |
//! | [`error`] | [`RouterError`](error::RouterError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod routing;
pub mod traits;
