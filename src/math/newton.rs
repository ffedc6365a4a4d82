//! Newton-Raphson stopping policy for invariant solvers.
//!
//! The pool invariants with a cubic (or higher) defining polynomial have no
//! closed form.  Their solvers evaluate one Newton step per iteration and
//! hand it to [`NewtonPolicy::solve`], which owns the control flow:
//!
//! 1. A step of at most one unit means the root is exact: stop.
//! 2. Once [`min_iterations`](NewtonPolicy::min_iterations) have run, an
//!    upward step stops the solve.  Iterates approach the root from
//!    above, so an upward step is rounding noise.
//! 3. Once [`min_iterations`](NewtonPolicy::min_iterations) have run, a
//!    step that did not shrink by at least
//!    [`shrink_factor`](NewtonPolicy::shrink_factor) relative to the
//!    previous one stops the solve.
//! 4. Otherwise the step is applied.  Exhausting
//!    [`max_iterations`](NewtonPolicy::max_iterations) is a
//!    [`DidNotConverge`](RouterError::DidNotConverge) failure, never a
//!    stale estimate.
//!
//! The minimum iteration count guards against stopping early when the
//! initial guess is poor and the first steps have not settled into
//! quadratic convergence yet.

use alloy_primitives::U256;

use super::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_ITERATIONS, DEFAULT_SHRINK_FACTOR};
use super::fixed_point::{div_down, ONE};
use crate::error::{Result, RouterError};

/// Tunable stop rule for Newton iterations.
///
/// # Examples
///
/// ```
/// use smart_order_router::math::NewtonPolicy;
///
/// let policy = NewtonPolicy::default();
/// assert_eq!(policy.min_iterations(), 5);
/// assert_eq!(policy.max_iterations(), 255);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NewtonPolicy {
    min_iterations: u32,
    shrink_factor: U256,
    max_iterations: u32,
}

impl Default for NewtonPolicy {
    fn default() -> Self {
        Self {
            min_iterations: DEFAULT_MIN_ITERATIONS,
            shrink_factor: DEFAULT_SHRINK_FACTOR,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl NewtonPolicy {
    /// Creates a policy.
    ///
    /// `shrink_factor` is an 18-decimal fixed-point value.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] if the shrink factor
    /// is not above one, if `max_iterations` is zero, or if
    /// `min_iterations` exceeds `max_iterations`.
    pub fn new(min_iterations: u32, shrink_factor: U256, max_iterations: u32) -> Result<Self> {
        if shrink_factor <= ONE {
            return Err(RouterError::InvalidConfiguration(
                "newton shrink factor must be greater than one",
            ));
        }
        if max_iterations == 0 {
            return Err(RouterError::InvalidConfiguration(
                "newton max iterations must be positive",
            ));
        }
        if min_iterations > max_iterations {
            return Err(RouterError::InvalidConfiguration(
                "newton min iterations must not exceed max iterations",
            ));
        }
        Ok(Self {
            min_iterations,
            shrink_factor,
            max_iterations,
        })
    }

    /// Returns a copy with a different minimum iteration count.
    #[must_use]
    pub const fn with_min_iterations(mut self, min_iterations: u32) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    /// Minimum iterations before an early stop is allowed.
    #[must_use]
    pub const fn min_iterations(&self) -> u32 {
        self.min_iterations
    }

    /// Required step shrink per iteration (fixed point).
    #[must_use]
    pub const fn shrink_factor(&self) -> U256 {
        self.shrink_factor
    }

    /// Hard iteration cap.
    #[must_use]
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Runs the iteration from `initial`.
    ///
    /// `step` evaluates the Newton step at the current estimate.
    /// `what` names the solve in the non-convergence error.
    ///
    /// # Errors
    ///
    /// - [`RouterError::DidNotConverge`] if the cap is reached.
    /// - [`RouterError::Underflow`] if a downward step passes zero.
    /// - Any error returned by `step`.
    pub fn solve<F>(&self, initial: U256, what: &'static str, mut step: F) -> Result<NewtonSolution>
    where
        F: FnMut(U256) -> Result<NewtonStep>,
    {
        let mut root = initial;
        let mut previous = U256::ZERO;

        for iteration in 0..self.max_iterations {
            let delta = step(root)?;
            let settled = iteration >= self.min_iterations;

            if delta.magnitude <= U256::from(1u8) {
                return Ok(NewtonSolution::new(root, iteration));
            }
            if settled && delta.increase {
                return Ok(NewtonSolution::new(root, iteration));
            }
            if settled && iteration >= 1 && delta.magnitude >= div_down(previous, self.shrink_factor)? {
                return Ok(NewtonSolution::new(root, iteration));
            }

            previous = delta.magnitude;
            root = if delta.increase {
                root.checked_add(delta.magnitude)
                    .ok_or(RouterError::Overflow("newton step"))?
            } else {
                root.checked_sub(delta.magnitude)
                    .ok_or(RouterError::Underflow("newton step"))?
            };
        }

        tracing::warn!(what, max = self.max_iterations, "newton iteration cap reached");
        Err(RouterError::DidNotConverge(what))
    }
}

/// One Newton step: the distance to move and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewtonStep {
    /// Absolute step size.
    pub magnitude: U256,
    /// `true` if the estimate should grow.
    pub increase: bool,
}

impl NewtonStep {
    /// Builds the step `target − current` without signed arithmetic.
    #[must_use]
    pub fn between(current: U256, target: U256) -> Self {
        if target >= current {
            Self {
                magnitude: target - current,
                increase: true,
            }
        } else {
            Self {
                magnitude: current - target,
                increase: false,
            }
        }
    }
}

/// A converged root and the number of steps applied to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewtonSolution {
    root: U256,
    steps: u32,
}

impl NewtonSolution {
    /// Creates a solution.
    #[must_use]
    pub const fn new(root: U256, steps: u32) -> Self {
        Self { root, steps }
    }

    /// The converged estimate.
    #[must_use]
    pub const fn root(&self) -> U256 {
        self.root
    }

    /// Steps applied before the stop rule fired.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }
}
