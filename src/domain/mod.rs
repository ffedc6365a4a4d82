//! Fundamental domain value types used throughout the router.
//!
//! Tokens, raw amounts, decimal scaling, fixed-point ratios and prices,
//! and swap specifications.  All types are newtypes with validated
//! constructors.

mod amount;
mod decimals;
mod pool_id;
mod pool_kind;
mod price;
mod ratio;
mod rounding;
mod swap_spec;
mod token;
mod token_id;

pub use amount::Amount;
pub use decimals::Decimals;
pub use pool_id::PoolId;
pub use pool_kind::PoolKind;
pub use price::Price;
pub use ratio::Ratio;
pub use rounding::Rounding;
pub use swap_spec::{SwapSpec, SwapType};
pub use token::Token;
pub use token_id::TokenId;
