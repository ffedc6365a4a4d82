//! Immutable pool snapshot indexed for routing.
//!
//! A [`PoolSnapshot`] is built once from a set of pools and never mutated.
//! Every pool is reachable by id; only routable pools (swaps enabled, no
//! zero balance) are reachable by token, so the proposal stage never sees
//! a pool that cannot trade.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::domain::{Decimals, PoolId, TokenId};
use crate::error::{Result, RouterError};
use crate::factory::PoolRecord;
use crate::pools::PoolBox;
use crate::traits::PoolMath;

/// Accepted shapes of a JSON pool dump.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoolDump {
    List(Vec<PoolRecord>),
    Wrapped { pools: Vec<PoolRecord> },
}

/// Read-only set of pools the router works on.
///
/// # Examples
///
/// ```
/// use smart_order_router::routing::PoolSnapshot;
///
/// let snapshot = PoolSnapshot::from_json("[]").expect("valid dump");
/// assert!(snapshot.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    pools: Vec<PoolBox>,
    by_id: HashMap<PoolId, usize>,
    by_token: HashMap<TokenId, Vec<usize>>,
    tokens: HashMap<TokenId, Decimals>,
}

impl PoolSnapshot {
    /// Indexes `pools`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] if two pools share an id or a
    /// token is declared with different decimals by two pools.
    pub fn new(pools: Vec<PoolBox>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(pools.len());
        let mut by_token: HashMap<TokenId, Vec<usize>> = HashMap::new();
        let mut tokens = HashMap::new();

        for (index, pool) in pools.iter().enumerate() {
            if by_id.insert(pool.id().clone(), index).is_some() {
                return Err(RouterError::InvalidInput("duplicate pool id in snapshot"));
            }
            for token in pool.tokens() {
                if let Some(known) = tokens.insert(token.id(), token.decimals()) {
                    if known != token.decimals() {
                        return Err(RouterError::InvalidInput(
                            "token declared with conflicting decimals",
                        ));
                    }
                }
            }
            if !pool.is_routable() {
                tracing::debug!(pool = %pool.id(), "pool excluded from routing");
                continue;
            }
            for token in pool.tokens() {
                by_token.entry(token.id()).or_default().push(index);
            }
        }

        Ok(Self {
            pools,
            by_id,
            by_token,
            tokens,
        })
    }

    /// Builds every record and indexes the result.
    ///
    /// # Errors
    ///
    /// Any record conversion error, or the errors of [`new`](Self::new).
    pub fn from_records(records: &[PoolRecord]) -> Result<Self> {
        let pools = records
            .iter()
            .map(PoolRecord::to_pool)
            .collect::<Result<Vec<_>>>()?;
        Self::new(pools)
    }

    /// Loads a JSON pool dump: either an array of pool records or an
    /// object with a `pools` array.
    ///
    /// # Errors
    ///
    /// [`RouterError::Parse`] on malformed JSON, otherwise the errors of
    /// [`from_records`](Self::from_records).
    pub fn from_json(json: &str) -> Result<Self> {
        let records = match serde_json::from_str::<PoolDump>(json)? {
            PoolDump::List(records) | PoolDump::Wrapped { pools: records } => records,
        };
        Self::from_records(&records)
    }

    /// Number of pools, routable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// `true` if the snapshot holds no pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// All pools in insertion order.
    #[must_use]
    pub fn pools(&self) -> &[PoolBox] {
        &self.pools
    }

    /// The pool with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] for an unknown id.
    pub fn pool(&self, id: &PoolId) -> Result<&PoolBox> {
        self.by_id
            .get(id)
            .and_then(|&i| self.pools.get(i))
            .ok_or(RouterError::InvalidInput("unknown pool id"))
    }

    /// Routable pools holding `token`.
    pub fn routable_with(&self, token: TokenId) -> impl Iterator<Item = &PoolBox> + '_ {
        self.by_token
            .get(&token)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.pools.get(i))
    }

    /// `true` if any pool, routable or not, holds `token`.
    #[must_use]
    pub fn knows_token(&self, token: TokenId) -> bool {
        self.tokens.contains_key(&token)
    }

    /// Decimals of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] for a token no pool holds.
    pub fn decimals_of(&self, token: TokenId) -> Result<Decimals> {
        self.tokens
            .get(&token)
            .copied()
            .ok_or(RouterError::InvalidInput("unknown token"))
    }

    /// Tokens reachable from `token` through one routable pool.
    #[must_use]
    pub fn neighbours(&self, token: TokenId) -> HashSet<TokenId> {
        self.routable_with(token)
            .flat_map(|pool| pool.tokens().iter().map(|t| t.id()))
            .filter(|&t| t != token)
            .collect()
    }
}
