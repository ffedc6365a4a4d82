//! Pool instantiation via the factory pattern.
//!
//! The [`DefaultPoolFactory`] creates pool instances from [`PoolConfig`]
//! values, validating configuration and dispatching to the appropriate
//! pool constructor based on the config variant.  [`PoolRecord`] decodes
//! one entry of a JSON pool dump into such a config.
//!
//! # Usage
//!
//! ```rust
//! use smart_order_router::factory::PoolRecord;
//! use smart_order_router::traits::PoolMath;
//!
//! let json = r#"{
//!     "id": "0x01",
//!     "poolType": "Weighted",
//!     "swapFee": "0.0025",
//!     "tokens": [
//!         {"address": "0x0101010101010101010101010101010101010101",
//!          "balance": "1000", "decimals": 18, "weight": "0.5"},
//!         {"address": "0x0202020202020202020202020202020202020202",
//!          "balance": "2000", "decimals": 6, "weight": "0.5"}
//!     ]
//! }"#;
//! let record: PoolRecord = serde_json::from_str(json).expect("valid json");
//! let pool = record.to_pool().expect("pool created");
//! assert_eq!(pool.tokens().len(), 2);
//! ```
//!
//! # Feature Gating
//!
//! Each match arm is gated behind its respective pool feature flag.
//! If a config variant is passed for a pool family whose feature is not
//! enabled, a [`RouterError::InvalidConfiguration`] is returned.
//!
//! [`PoolConfig`]: crate::config::PoolConfig
//! [`RouterError::InvalidConfiguration`]: crate::error::RouterError::InvalidConfiguration

mod default_factory;
mod pool_record;

pub use default_factory::DefaultPoolFactory;
pub use pool_record::{PoolRecord, TokenRecord};
