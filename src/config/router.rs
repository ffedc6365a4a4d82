//! Router-wide tuning knobs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Ratio, Rounding};
use crate::error::{Result, RouterError};
use crate::math::fixed_point;
use crate::math::NewtonPolicy;
use crate::pools::MathContext;

/// Largest supported hop count.
pub const MAX_HOPS: usize = 4;

/// Configuration bundle passed to every routing computation.
///
/// There is no process-wide state: two routers with different configs
/// can run side by side.  Fractions are decimals and are converted to
/// 18-decimal fixed point once, when the [`MathContext`] and allocator
/// parameters are derived.
///
/// | Field | Default | Meaning |
/// |-------|---------|---------|
/// | `max_pools` | 4 | candidate paths kept, and paths used at once |
/// | `max_hops` | 2 | pools per path |
/// | `price_tolerance` | 0.00001 | relative marginal-gain slack favouring active paths |
/// | `newton_min_iterations` | 5 | Newton steps before an early stop |
/// | `newton_shrink_factor` | 8 | required step shrink per iteration |
/// | `newton_max_iterations` | 255 | hard Newton cap |
/// | `balance_ratio_limit` | 0.3 | largest balance fraction moved by one operation |
/// | `allocation_steps` | 100 | increments the allocator splits the total into |
/// | `negligible_fraction` | 0.001 | share below which a path is dropped |
/// | `swap_cost_per_hop` | 0 | gas cost per hop, in raw output-token units |
///
/// # Examples
///
/// ```
/// use smart_order_router::config::RouterConfig;
///
/// let cfg = RouterConfig::from_toml_str("max_pools = 2\nbalance_ratio_limit = 0.25")
///     .expect("valid config");
/// assert_eq!(cfg.max_pools, 2);
/// assert_eq!(cfg.max_hops, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Candidate paths kept after ranking; also the most paths an
    /// allocation may use.
    pub max_pools: usize,
    /// Most pools in one path.
    pub max_hops: usize,
    /// Relative slack in marginal gain within which an already-used path
    /// is preferred over opening a new one.
    pub price_tolerance: Decimal,
    /// Newton iterations before the shrink rule may stop a solve.
    pub newton_min_iterations: u32,
    /// Required step shrink factor per Newton iteration.
    pub newton_shrink_factor: Decimal,
    /// Hard Newton iteration cap.
    pub newton_max_iterations: u32,
    /// Largest fraction of a balance one pool operation may move.
    pub balance_ratio_limit: Decimal,
    /// Number of increments the allocator splits the total into.
    pub allocation_steps: u32,
    /// Paths allocated less than this share of the total are dropped.
    pub negligible_fraction: Decimal,
    /// Cost of one hop in raw output-token units.
    pub swap_cost_per_hop: Amount,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_pools: 4,
            max_hops: 2,
            price_tolerance: Decimal::new(1, 5),
            newton_min_iterations: 5,
            newton_shrink_factor: Decimal::from(8u8),
            newton_max_iterations: 255,
            balance_ratio_limit: Decimal::new(3, 1),
            allocation_steps: 100,
            negligible_fraction: Decimal::new(1, 3),
            swap_cost_per_hop: Amount::ZERO,
        }
    }
}

impl RouterConfig {
    /// Parses and validates a TOML document; missing keys take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// - [`RouterError::Parse`] on malformed TOML or unknown keys.
    /// - Any error from [`validate`](Self::validate).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] naming the first
    /// out-of-range field.
    pub fn validate(&self) -> Result<()> {
        if self.max_pools == 0 {
            return Err(RouterError::InvalidConfiguration(
                "max_pools must be positive",
            ));
        }
        if self.max_hops == 0 || self.max_hops > MAX_HOPS {
            return Err(RouterError::InvalidConfiguration(
                "max_hops must be within 1..=4",
            ));
        }
        if self.allocation_steps == 0 {
            return Err(RouterError::InvalidConfiguration(
                "allocation_steps must be positive",
            ));
        }
        if self.negligible_fraction >= Decimal::ONE {
            return Err(RouterError::InvalidConfiguration(
                "negligible_fraction must be below one",
            ));
        }
        self.price_tolerance()?;
        self.negligible_fraction()?;
        self.math_context()?;
        Ok(())
    }

    /// Newton stop rule described by this config.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] for an invalid
    /// policy.
    pub fn newton_policy(&self) -> Result<NewtonPolicy> {
        let shrink = fixed_point::from_decimal(self.newton_shrink_factor, Rounding::Down)
            .map_err(|_| RouterError::InvalidConfiguration("newton_shrink_factor is invalid"))?;
        NewtonPolicy::new(
            self.newton_min_iterations,
            shrink,
            self.newton_max_iterations,
        )
    }

    /// Builds the context threaded through the pool math.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] for an invalid Newton
    /// policy or a balance-ratio limit outside `(0, 1)`.
    pub fn math_context(&self) -> Result<MathContext> {
        let limit = fraction(self.balance_ratio_limit, "balance_ratio_limit must be within (0, 1)")?;
        MathContext::new(self.newton_policy()?, limit)
    }

    /// `price_tolerance` as a fixed-point fraction.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] outside `[0, 1]`.
    pub fn price_tolerance(&self) -> Result<Ratio> {
        fraction(self.price_tolerance, "price_tolerance must be within [0, 1]")
    }

    /// `negligible_fraction` as a fixed-point fraction.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] outside `[0, 1]`.
    pub fn negligible_fraction(&self) -> Result<Ratio> {
        fraction(self.negligible_fraction, "negligible_fraction must be within [0, 1)")
    }
}

fn fraction(value: Decimal, message: &'static str) -> Result<Ratio> {
    Ratio::from_decimal(value).map_err(|_| RouterError::InvalidConfiguration(message))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::fixed_point::ONE;
    use alloy_primitives::U256;

    #[test]
    fn defaults_are_valid() {
        let cfg = RouterConfig::default();
        assert!(cfg.validate().is_ok());
        let Ok(ctx) = cfg.math_context() else {
            panic!("expected Ok");
        };
        assert_eq!(ctx.balance_ratio_limit(), U256::from(3u8) * ONE / U256::from(10u8));
        assert_eq!(ctx.newton().shrink_factor(), U256::from(8u8) * ONE);
    }

    #[test]
    fn toml_overrides_defaults() {
        let Ok(cfg) = RouterConfig::from_toml_str(
            r#"
            max_pools = 3
            max_hops = 1
            newton_min_iterations = 2
            price_tolerance = "0.001"
            swap_cost_per_hop = "1500"
            "#,
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(cfg.max_pools, 3);
        assert_eq!(cfg.max_hops, 1);
        assert_eq!(cfg.newton_min_iterations, 2);
        assert_eq!(cfg.swap_cost_per_hop, Amount::from_u128(1_500));
        assert_eq!(cfg.allocation_steps, 100);
        let Ok(tol) = cfg.price_tolerance() else {
            panic!("expected Ok");
        };
        assert_eq!(tol.get(), ONE / U256::from(1_000u16));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        assert!(matches!(
            RouterConfig::from_toml_str("max_pool = 3"),
            Err(RouterError::Parse(_))
        ));
    }

    #[test]
    fn invalid_values_rejected() {
        let mut cfg = RouterConfig::default();
        cfg.max_pools = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = RouterConfig::default();
        cfg.balance_ratio_limit = Decimal::ZERO;
        assert!(matches!(
            cfg.validate(),
            Err(RouterError::InvalidConfiguration(_))
        ));

        let mut cfg = RouterConfig::default();
        cfg.balance_ratio_limit = Decimal::ONE;
        assert!(matches!(
            cfg.validate(),
            Err(RouterError::InvalidConfiguration(_))
        ));

        let mut cfg = RouterConfig::default();
        cfg.newton_shrink_factor = Decimal::ONE;
        assert!(cfg.validate().is_err());

        let mut cfg = RouterConfig::default();
        cfg.max_hops = MAX_HOPS + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_round_trip_keeps_values() {
        let cfg = RouterConfig::default();
        let Ok(json) = serde_json::to_string(&cfg) else {
            panic!("serialize");
        };
        let Ok(back) = serde_json::from_str::<RouterConfig>(&json) else {
            panic!("deserialize");
        };
        assert_eq!(back, cfg);
    }
}
