//! Integration tests exercising the full system from a pool dump to a route.
//!
//! These tests go through the public API only: snapshot loading, router
//! configuration, single- and multi-path routing in both directions, and
//! the error surface a caller sees.
//!
//! These tests require all pool features to be enabled.

#![cfg(feature = "all-pools")]
#![allow(clippy::panic)]

use alloy_primitives::U256;
use smart_order_router::prelude::*;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const E18: u128 = 1_000_000_000_000_000_000;

const A: &str = "0x0101010101010101010101010101010101010101";
const B: &str = "0x0202020202020202020202020202020202020202";
const C: &str = "0x0303030303030303030303030303030303030303";
const D: &str = "0x0404040404040404040404040404040404040404";

fn token(address: &str) -> TokenId {
    let Ok(t) = address.parse() else {
        panic!("valid address");
    };
    t
}

fn weighted(id: &str, (x, bx): (&str, &str), (y, by): (&str, &str), fee: &str) -> String {
    format!(
        r#"{{"id": "{id}", "poolType": "Weighted", "swapFee": "{fee}", "tokens": [
            {{"address": "{x}", "balance": "{bx}", "decimals": 18, "weight": "0.5"}},
            {{"address": "{y}", "balance": "{by}", "decimals": 18, "weight": "0.5"}}]}}"#
    )
}

fn snapshot(pools: &[String]) -> PoolSnapshot {
    let json = format!("[{}]", pools.join(","));
    let Ok(s) = PoolSnapshot::from_json(&json) else {
        panic!("valid dump: {json}");
    };
    s
}

fn router() -> Router {
    let Ok(r) = Router::new(RouterConfig::default()) else {
        panic!("valid config");
    };
    r
}

fn exact_in(amount: u128) -> SwapSpec {
    let Ok(spec) = SwapSpec::exact_in(Amount::from_u128(amount)) else {
        panic!("non-zero amount");
    };
    spec
}

fn exact_out(amount: u128) -> SwapSpec {
    let Ok(spec) = SwapSpec::exact_out(Amount::from_u128(amount)) else {
        panic!("non-zero amount");
    };
    spec
}

fn route(snapshot: &PoolSnapshot, from: &str, to: &str, spec: SwapSpec) -> RouteResult {
    let Ok(r) = router().route(snapshot, token(from), token(to), spec) else {
        panic!("route from {from} to {to} failed");
    };
    r
}

/// Amount the route sends through `pool`, zero when the pool is unused.
fn share_of(route: &RouteResult, pool: &str) -> Amount {
    let id = PoolId::from(pool);
    route
        .paths
        .iter()
        .find(|p| p.path.uses_pool(&id))
        .map_or(Amount::ZERO, |p| p.amount)
}

fn placed(route: &RouteResult) -> U256 {
    route
        .paths
        .iter()
        .fold(U256::ZERO, |acc, p| acc + p.amount.get())
}

// ---------------------------------------------------------------------------
// Splitting across direct pools
// ---------------------------------------------------------------------------

#[test]
fn deeper_pool_takes_the_trade() {
    let snap = snapshot(&[
        weighted("p1", (A, "1000"), (B, "1000"), "0"),
        weighted("p2", (A, "2000"), (B, "500"), "0"),
    ]);
    let r = route(&snap, A, B, exact_in(100 * E18));

    assert_eq!(placed(&r), U256::from(100 * E18));
    assert!(share_of(&r, "p1") >= share_of(&r, "p2"));
    // p1 alone returns 90.909..; p2 alone about 23.8.
    assert!(r.return_amount >= Amount::from_u128(90_909_090_909_090_000_000));
    assert!(r.return_amount > Amount::from_u128(24 * E18));
    assert_eq!(r.return_amount, r.return_amount_considering_fees);
}

#[test]
fn identical_pools_beat_either_alone() {
    let snap = snapshot(&[
        weighted("p1", (A, "1000"), (B, "1000"), "0"),
        weighted("p2", (A, "1000"), (B, "1000"), "0"),
    ]);
    let r = route(&snap, A, B, exact_in(100 * E18));

    assert_eq!(r.paths.len(), 2);
    assert_eq!(share_of(&r, "p1"), Amount::from_u128(50 * E18));
    assert_eq!(share_of(&r, "p2"), Amount::from_u128(50 * E18));
    // 95.238.. split against 90.909.. through one pool.
    assert!(r.return_amount > Amount::from_u128(95_200_000_000_000_000_000));
    assert_eq!(r.market_spot_price.get(), U256::from(E18));
}

#[test]
fn fees_reduce_the_split_return() {
    let snap = snapshot(&[
        weighted("p1", (A, "1000"), (B, "1000"), "0.003"),
        weighted("p2", (A, "1000"), (B, "1000"), "0.003"),
    ]);
    let r = route(&snap, A, B, exact_in(100 * E18));

    assert_eq!(r.paths.len(), 2);
    // 94.966.. with a 0.3% fee.
    assert!(r.return_amount > Amount::from_u128(94_900_000_000_000_000_000));
    assert!(r.return_amount < Amount::from_u128(95_000_000_000_000_000_000));
}

#[test]
fn max_pools_from_toml_limits_the_split() {
    let snap = snapshot(&[
        weighted("p1", (A, "1000"), (B, "1000"), "0"),
        weighted("p2", (A, "1000"), (B, "1000"), "0"),
    ]);
    let Ok(config) = RouterConfig::from_toml_str("max_pools = 1") else {
        panic!("valid toml");
    };
    let Ok(router) = Router::new(config) else {
        panic!("valid config");
    };
    let Ok(r) = router.route(&snap, token(A), token(B), exact_in(100 * E18)) else {
        panic!("route");
    };
    assert_eq!(r.paths.len(), 1);
    assert!(r.return_amount < Amount::from_u128(91 * E18));
}

#[test]
fn disabled_pool_is_skipped() {
    let snap = snapshot(&[
        weighted("p1", (A, "1000"), (B, "1000"), "0"),
        format!(
            r#"{{"id": "off", "poolType": "Weighted", "swapFee": "0", "swapEnabled": false, "tokens": [
                {{"address": "{A}", "balance": "1000", "decimals": 18, "weight": "0.5"}},
                {{"address": "{B}", "balance": "1000", "decimals": 18, "weight": "0.5"}}]}}"#
        ),
    ]);
    let r = route(&snap, A, B, exact_in(10 * E18));
    assert_eq!(r.paths.len(), 1);
    assert_eq!(share_of(&r, "off"), Amount::ZERO);
}

#[test]
fn routing_is_deterministic() {
    let snap = snapshot(&[
        weighted("p1", (A, "1000"), (B, "1000"), "0.003"),
        weighted("p2", (A, "3000"), (B, "2500"), "0.001"),
        weighted("p3", (A, "500"), (B, "700"), "0.002"),
    ]);
    let first = route(&snap, A, B, exact_in(150 * E18));
    let second = route(&snap, A, B, exact_in(150 * E18));
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Multi-hop and exact-out
// ---------------------------------------------------------------------------

#[test]
fn two_hop_route_through_intermediate_token() {
    let snap = snapshot(&[
        weighted("ac", (A, "1000"), (C, "1000"), "0"),
        weighted("cb", (C, "1000"), (B, "1000"), "0"),
    ]);
    let r = route(&snap, A, B, exact_in(10 * E18));

    assert_eq!(r.paths.len(), 1);
    assert_eq!(r.hop_count(), 2);
    let hops = r.paths[0].path.hops();
    assert_eq!(hops[0].token_out, token(C));
    assert_eq!(hops[1].token_in, token(C));
    // 10 -> 9.901 C -> 9.804 B.
    assert!(r.return_amount > Amount::from_u128(9_800_000_000_000_000_000));
    assert!(r.return_amount < Amount::from_u128(9_810_000_000_000_000_000));
}

#[test]
fn exact_out_splits_to_pay_less() {
    let snap = snapshot(&[
        weighted("p1", (A, "1000"), (B, "1000"), "0"),
        weighted("p2", (A, "1000"), (B, "1000"), "0"),
    ]);
    let r = route(&snap, A, B, exact_out(50 * E18));

    assert_eq!(r.swap_type, SwapType::ExactOut);
    assert_eq!(placed(&r), U256::from(50 * E18));
    assert_eq!(r.paths.len(), 2);
    // 51.28 split against 52.63 through one pool.
    assert!(r.return_amount > Amount::from_u128(50 * E18));
    assert!(r.return_amount < Amount::from_u128(52 * E18));
    for p in &r.paths {
        assert!(p.effective_price.get() > U256::from(E18));
    }
}

// ---------------------------------------------------------------------------
// Other pool families
// ---------------------------------------------------------------------------

fn three_clp_dump() -> String {
    format!(
        r#"{{"id": "g3", "poolType": "Gyro3", "swapFee": "0", "root3Alpha": "0.9", "tokens": [
            {{"address": "{A}", "balance": "1000", "decimals": 18}},
            {{"address": "{B}", "balance": "1000", "decimals": 18}},
            {{"address": "{C}", "balance": "1000", "decimals": 18}}]}}"#
    )
}

#[test]
fn three_clp_symmetric_invariant() {
    let snap = snapshot(&[three_clp_dump()]);
    let Ok(pool) = snap.pool(&PoolId::from("g3")) else {
        panic!("pool loaded");
    };
    let Ok(inv) = pool.invariant(&MathContext::default()) else {
        panic!("invariant");
    };
    // b / (1 - ∛α) = 1000 / 0.1.
    let expected = U256::from(10_000 * E18);
    assert!(inv.abs_diff(expected) <= U256::from(1u8), "{inv} vs {expected}");
}

#[test]
fn three_clp_route_has_low_slippage() {
    let snap = snapshot(&[three_clp_dump()]);
    let r = route(&snap, A, B, exact_in(10 * E18));
    assert_eq!(r.paths.len(), 1);
    assert!(r.return_amount > Amount::from_u128(9_980_000_000_000_000_000));
    assert!(r.return_amount < Amount::from_u128(10 * E18));
}

#[test]
fn unconverged_three_clp_pool_leaves_the_weighted_route() {
    let g3 = format!(
        r#"{{"id": "g3", "poolType": "Gyro3", "swapFee": "0", "root3Alpha": "0.9", "tokens": [
            {{"address": "{A}", "balance": "1000000", "decimals": 18}},
            {{"address": "{B}", "balance": "1200000", "decimals": 18}},
            {{"address": "{C}", "balance": "900000", "decimals": 18}}]}}"#
    );
    let snap = snapshot(&[g3, weighted("p1", (A, "1000"), (B, "1000"), "0")]);
    let Ok(config) =
        RouterConfig::from_toml_str("newton_min_iterations = 2\nnewton_max_iterations = 2")
    else {
        panic!("valid toml");
    };
    let Ok(router) = Router::new(config) else {
        panic!("valid config");
    };
    let Ok(r) = router.route(&snap, token(A), token(B), exact_in(10 * E18)) else {
        panic!("route through the weighted pool");
    };
    assert_eq!(r.paths.len(), 1);
    assert!(r.paths[0].path.uses_pool(&PoolId::from("p1")));
    assert_eq!(share_of(&r, "g3"), Amount::ZERO);
    // 1000 · 10 / 1010.
    assert!(r.return_amount > Amount::from_u128(9_900 * E18 / 1_000));
}

#[test]
fn stable_route_near_parity() {
    let json = format!(
        r#"[{{"id": "s", "poolType": "Stable", "swapFee": "0", "amp": "100", "tokens": [
            {{"address": "{A}", "balance": "1000", "decimals": 18}},
            {{"address": "{B}", "balance": "1000", "decimals": 18}}]}}]"#
    );
    let Ok(snap) = PoolSnapshot::from_json(&json) else {
        panic!("valid dump");
    };
    let r = route(&snap, A, B, exact_in(10 * E18));
    assert!(r.return_amount > Amount::from_u128(9_990_000_000_000_000_000));
    assert!(r.return_amount < Amount::from_u128(10 * E18));
}

// ---------------------------------------------------------------------------
// Snapshot loading
// ---------------------------------------------------------------------------

#[test]
fn wrapped_dump_with_mixed_decimals() {
    let json = format!(
        r#"{{"pools": [{{"id": "usdc-b", "poolType": "Weighted", "swapFee": "0", "tokens": [
            {{"address": "{A}", "balance": "1000", "decimals": 6, "weight": "0.5"}},
            {{"address": "{B}", "balance": "1000", "decimals": 18, "weight": "0.5"}}]}}]}}"#
    );
    let Ok(snap) = PoolSnapshot::from_json(&json) else {
        panic!("valid dump");
    };
    assert_eq!(snap.len(), 1);
    let Ok(decimals) = snap.decimals_of(token(A)) else {
        panic!("known token");
    };
    assert_eq!(decimals.get(), 6);

    // 10 units of a 6-decimal token, raw.
    let r = route(&snap, A, B, exact_in(10_000_000));
    // 1000 * 10 / 1010 = 9.90099..
    assert!(r.return_amount > Amount::from_u128(9_900_000_000_000_000_000));
    assert!(r.return_amount < Amount::from_u128(9_901_000_000_000_000_000));

    let Ok(encoded) = serde_json::to_string(&r) else {
        panic!("serializable");
    };
    assert!(encoded.contains("\"returnAmount\""));
    assert!(encoded.contains("\"swapExactIn\""));
}

#[test]
fn malformed_dump_is_a_parse_error() {
    let result = PoolSnapshot::from_json(r#"[{"id": "x"}]"#);
    assert!(matches!(result, Err(RouterError::Parse(_))));
}

// ---------------------------------------------------------------------------
// Error surface
// ---------------------------------------------------------------------------

#[test]
fn amount_above_capacity_is_insufficient_liquidity() {
    let snap = snapshot(&[weighted("p1", (A, "1000"), (B, "1000"), "0")]);
    let result = router().route(&snap, token(A), token(B), exact_in(500 * E18));
    let Err(RouterError::InsufficientLiquidity {
        requested,
        available,
    }) = result
    else {
        panic!("expected InsufficientLiquidity, got {result:?}");
    };
    assert_eq!(requested, U256::from(500 * E18));
    // 30% of the 1000 A balance.
    assert_eq!(available, U256::from(300 * E18));
}

#[test]
fn best_effort_reports_the_shortfall() {
    let snap = snapshot(&[weighted("p1", (A, "1000"), (B, "1000"), "0")]);
    let Ok((r, shortfall)) =
        router().route_best_effort(&snap, token(A), token(B), exact_in(1_000 * E18))
    else {
        panic!("partial route");
    };
    assert_eq!(r.swap_amount, Amount::from_u128(300 * E18));
    assert_eq!(shortfall, Amount::from_u128(700 * E18));
}

#[test]
fn balance_ratio_limit_must_stay_below_one() {
    assert!(matches!(
        RouterConfig::from_toml_str("balance_ratio_limit = 1"),
        Err(RouterError::InvalidConfiguration(_))
    ));
    let snap = snapshot(&[weighted("p1", (A, "1000"), (B, "1000"), "0")]);
    let Ok(config) = RouterConfig::from_toml_str("balance_ratio_limit = 0.99") else {
        panic!("valid toml");
    };
    let Ok(router) = Router::new(config) else {
        panic!("valid config");
    };
    let Ok(r) = router.route(&snap, token(A), token(B), exact_in(10 * E18)) else {
        panic!("route under a wide ratio limit");
    };
    assert_eq!(r.swap_amount, Amount::from_u128(10 * E18));
    assert!(r.return_amount > Amount::from_u128(9_900 * E18 / 1_000));
}

#[test]
fn disconnected_tokens_have_no_path() {
    let snap = snapshot(&[
        weighted("ab", (A, "1000"), (B, "1000"), "0"),
        weighted("cd", (C, "1000"), (D, "1000"), "0"),
    ]);
    let result = router().route(&snap, token(A), token(D), exact_in(E18));
    assert!(matches!(result, Err(RouterError::NoPathFound)));
}

#[test]
fn unknown_or_equal_tokens_are_invalid_input() {
    let snap = snapshot(&[weighted("ab", (A, "1000"), (B, "1000"), "0")]);
    let unknown = router().route(&snap, token(A), token(D), exact_in(E18));
    assert!(matches!(unknown, Err(RouterError::InvalidInput(_))));
    let same = router().route(&snap, token(A), token(A), exact_in(E18));
    assert!(matches!(same, Err(RouterError::InvalidInput(_))));
}

#[test]
fn zero_amount_is_rejected() {
    assert!(matches!(
        SwapSpec::exact_in(Amount::ZERO),
        Err(RouterError::InvalidInput(_))
    ));
}
