//! Serde model of a pool snapshot dump.
//!
//! A [`PoolRecord`] mirrors one entry of a subgraph-style pool dump:
//! human-readable decimal balances, weights and fees, with the family
//! parameters as optional fields.  [`PoolRecord::to_config`] turns it into
//! a validated [`PoolConfig`].
//!
//! ```json
//! {
//!   "id": "0xabc",
//!   "poolType": "Weighted",
//!   "swapFee": "0.003",
//!   "swapEnabled": true,
//!   "tokens": [
//!     { "address": "0x…01", "balance": "1000.5", "decimals": 18, "weight": "0.8" },
//!     { "address": "0x…02", "balance": "250", "decimals": 6, "weight": "0.2" }
//!   ]
//! }
//! ```

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{PoolConfig, StableConfig, ThreeClpConfig, WeightedConfig};
use crate::domain::{Amount, Decimals, PoolId, PoolKind, Ratio, Rounding, Token, TokenId};
use crate::error::{Result, RouterError};
use crate::math::fixed_point::{self, div_down, ONE};
use crate::pools::{PoolBox, PoolState};

use super::DefaultPoolFactory;

const fn enabled() -> bool {
    true
}

/// One token entry of a [`PoolRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Token address.
    pub address: TokenId,
    /// Balance in whole tokens.
    pub balance: Decimal,
    /// Token decimals.
    pub decimals: u8,
    /// Unnormalized weight (weighted pools only).
    #[serde(default)]
    pub weight: Option<Decimal>,
}

/// One pool of a snapshot dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    /// Pool identifier.
    pub id: PoolId,
    /// On-chain address, when distinct from the id.
    #[serde(default)]
    pub address: Option<String>,
    /// Pool family.
    pub pool_type: PoolKind,
    /// Swap fee as a fraction (`0.003` = 0.3%).
    pub swap_fee: Decimal,
    /// Whether swaps are enabled.
    #[serde(default = "enabled")]
    pub swap_enabled: bool,
    /// Tokens with balances.
    pub tokens: Vec<TokenRecord>,
    /// Unscaled amplification (stable pools only).
    #[serde(default)]
    pub amp: Option<Decimal>,
    /// `∛α` (three-asset pools only).
    #[serde(default)]
    pub root3_alpha: Option<Decimal>,
}

impl PoolRecord {
    /// Converts the record into a validated pool configuration.
    ///
    /// Balances are truncated to the token's decimals.  Weights are
    /// normalized to sum to exactly one, the last weight absorbing the
    /// rounding remainder.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidPrecision`] for more than 18 decimals.
    /// - [`RouterError::InvalidWeight`] for a weighted pool with missing
    ///   or zero weights.
    /// - [`RouterError::InvalidConfiguration`] for missing or invalid
    ///   family parameters.
    /// - Any validation error of the family config.
    pub fn to_config(&self) -> Result<PoolConfig> {
        let state = self.state()?;
        match self.pool_type {
            PoolKind::Weighted => {
                let weights = self.normalized_weights()?;
                WeightedConfig::new(state, weights).map(PoolConfig::Weighted)
            }
            PoolKind::Stable => {
                let amp = self
                    .amp
                    .and_then(|a| a.trunc().to_u64())
                    .ok_or(RouterError::InvalidConfiguration("stable pool requires amp"))?;
                StableConfig::new(state, amp).map(PoolConfig::Stable)
            }
            PoolKind::ThreeClp => {
                let root3_alpha = self
                    .root3_alpha
                    .ok_or(RouterError::InvalidConfiguration(
                        "three-asset pool requires root3Alpha",
                    ))
                    .and_then(Ratio::from_decimal)?;
                ThreeClpConfig::new(state, root3_alpha).map(PoolConfig::ThreeClp)
            }
        }
    }

    /// Builds the pool through [`DefaultPoolFactory`].
    ///
    /// # Errors
    ///
    /// Same as [`to_config`](Self::to_config).
    pub fn to_pool(&self) -> Result<PoolBox> {
        DefaultPoolFactory::create(&self.to_config()?)
    }

    fn state(&self) -> Result<PoolState> {
        let mut tokens = Vec::with_capacity(self.tokens.len());
        let mut balances = Vec::with_capacity(self.tokens.len());
        for record in &self.tokens {
            let decimals = Decimals::new(record.decimals)?;
            let scaled = fixed_point::from_decimal(record.balance, Rounding::Down)?;
            balances.push(Amount::new(decimals.downscale(scaled, Rounding::Down)?));
            tokens.push(Token::new(record.address, decimals));
        }
        let swap_fee = Ratio::from_decimal(self.swap_fee)?;
        Ok(PoolState::new(self.id.clone(), tokens, balances, swap_fee)?.with_enabled(self.swap_enabled))
    }

    fn normalized_weights(&self) -> Result<Vec<Ratio>> {
        let raw = self
            .tokens
            .iter()
            .map(|t| {
                t.weight
                    .ok_or(RouterError::InvalidWeight("weighted pool token without weight"))
                    .and_then(|w| fixed_point::from_decimal(w, Rounding::Down))
            })
            .collect::<Result<Vec<U256>>>()?;
        let total = raw.iter().try_fold(U256::ZERO, |acc, w| {
            acc.checked_add(*w)
                .ok_or(RouterError::Overflow("weight total"))
        })?;
        if total.is_zero() {
            return Err(RouterError::InvalidWeight("weights sum to zero"));
        }

        let Some((_, leading)) = raw.split_last() else {
            return Err(RouterError::InvalidWeight("weighted pool without tokens"));
        };
        let mut weights = leading
            .iter()
            .map(|w| div_down(*w, total))
            .collect::<Result<Vec<U256>>>()?;
        let assigned = weights.iter().try_fold(U256::ZERO, |acc, w| {
            acc.checked_add(*w)
                .ok_or(RouterError::Overflow("weight total"))
        })?;
        let last = ONE
            .checked_sub(assigned)
            .ok_or(RouterError::InvalidWeight("weights exceed one"))?;
        weights.push(last);
        weights.into_iter().map(Ratio::from_fixed).collect()
    }
}

impl TryFrom<&PoolRecord> for PoolConfig {
    type Error = RouterError;

    fn try_from(record: &PoolRecord) -> Result<Self> {
        record.to_config()
    }
}
