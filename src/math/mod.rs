//! Arithmetic for pool math and routing.
//!
//! All pool math runs on 18-decimal fixed point over `U256` with an
//! explicit rounding direction at every multiply and divide.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`fixed_point`] | `mul_down`/`mul_up`, `div_down`/`div_up`, overflow-safe cube, powers, square root |
//! | [`log_exp`] | `ln`/`exp`/`pow` on fixed point |
//! | [`constants`] | thresholds and defaults of the on-chain arithmetic |
//! | [`NewtonPolicy`] | stop rule shared by the iterative invariant solvers |
//! | [`CheckedArithmetic`] | `Result`-returning arithmetic for [`Amount`](crate::domain::Amount) |

mod checked;
pub mod constants;
pub mod fixed_point;
pub mod log_exp;
mod newton;
mod rounding;

pub use checked::CheckedArithmetic;
pub use newton::{NewtonPolicy, NewtonSolution, NewtonStep};
pub use rounding::div_round;
