//! Property-based tests using `proptest` for pool math and allocation.
//!
//! 1. **Cube split equivalence**: the split cube matches the naive cube
//!    below the safe threshold and stays finite well above it.
//! 2. **Swap round trip**: `in_given_out(out_given_in(a))` returns `a`
//!    within the rounding tolerance, for every family, fee included.
//! 3. **Newton warm start**: restarting a solve from its own root takes at
//!    most one step.
//! 4. **Allocation invariants**: amounts sum to the total, respect every
//!    limit, and the blend is never worse than the best single path.

use alloy_primitives::U256;
use proptest::prelude::*;

use crate::config::{StableConfig, ThreeClpConfig, WeightedConfig};
use crate::domain::{Amount, PoolId, Ratio, SwapType, TokenId};
use crate::math::constants::SAFE_LARGE_POW3_THRESHOLD;
use crate::math::fixed_point::{
    mul_down, naive_pow3_down, split_pow3_down, wide_mul_div_down, ONE,
};
use crate::pools::state::tests::tok;
use crate::pools::{MathContext, PoolState, StablePool, ThreeClpPool, WeightedPool};
use crate::routing::{allocate, AllocatorParams};
use crate::traits::{FromConfig, PoolMath};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const E18: u128 = 1_000_000_000_000_000_000;
const FEE_BPS: u32 = 30;

fn t(b: u8) -> TokenId {
    tok(b, 18).id()
}

fn ratio(bps: u32) -> Ratio {
    let Ok(r) = Ratio::from_basis_points(bps) else {
        panic!("valid ratio");
    };
    r
}

fn state(balances: &[u128]) -> PoolState {
    let tokens = (1..=balances.len() as u8).map(|b| tok(b, 18)).collect();
    let Ok(s) = PoolState::new(
        PoolId::from("prop"),
        tokens,
        balances.iter().map(|&b| Amount::from_u128(b)).collect(),
        ratio(FEE_BPS),
    ) else {
        panic!("valid state");
    };
    s
}

fn make_weighted(bi: u128, bo: u128, weight_in_bps: u32) -> WeightedPool {
    let Ok(cfg) = WeightedConfig::new(
        state(&[bi, bo]),
        vec![ratio(weight_in_bps), ratio(10_000 - weight_in_bps)],
    ) else {
        panic!("valid weighted config");
    };
    let Ok(pool) = WeightedPool::from_config(&cfg) else {
        panic!("valid weighted pool");
    };
    pool
}

fn make_stable(bi: u128, bo: u128, amp: u64) -> StablePool {
    let Ok(cfg) = StableConfig::new(state(&[bi, bo]), amp) else {
        panic!("valid stable config");
    };
    let Ok(pool) = StablePool::from_config(&cfg) else {
        panic!("valid stable pool");
    };
    pool
}

fn make_three_clp(balances: [u128; 3], root3_alpha: U256) -> ThreeClpPool {
    let Ok(r) = Ratio::from_fixed(root3_alpha) else {
        panic!("valid root3 alpha");
    };
    let Ok(cfg) = ThreeClpConfig::new(state(&balances), r) else {
        panic!("valid three-clp config");
    };
    let Ok(pool) = ThreeClpPool::from_config(&cfg) else {
        panic!("valid three-clp pool");
    };
    pool
}

/// `|back - amount_in| <= amount_in / 1e9 + balance_in / 1e12 + 10`.
fn within_round_trip_tolerance(back: Amount, amount_in: u128, balance_in: u128) -> bool {
    let tolerance = U256::from(amount_in / 1_000_000_000 + balance_in / 1_000_000_000_000 + 10);
    back.get().abs_diff(U256::from(amount_in)) <= tolerance
}

/// Runs the round trip; `None` when the pool rejects either direction.
fn round_trip<P: PoolMath>(pool: &P, amount_in: u128) -> Option<Amount> {
    let ctx = MathContext::default();
    let out = pool
        .out_given_in(&ctx, t(1), t(2), Amount::from_u128(amount_in))
        .ok()?;
    if out.is_zero() {
        return None;
    }
    pool.in_given_out(&ctx, t(1), t(2), out).ok()
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Balances between 1 and 1e9 whole tokens.
fn balance_strategy() -> impl Strategy<Value = u128> {
    E18..=1_000_000_000 * E18
}

/// Trade size as a share of the input balance, in millionths, up to the
/// 30% ratio limit.
fn share_strategy() -> impl Strategy<Value = u128> {
    1u128..=300_000u128
}

/// `∛α` in `[0.5, 0.999]`.
fn root3_alpha_strategy() -> impl Strategy<Value = U256> {
    (500_000u64..=999_000u64).prop_map(|v| U256::from(v) * U256::from(1_000_000_000_000u64))
}

// ---------------------------------------------------------------------------
// Property 1: Cube split equivalence
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_split_cube_matches_naive(x in 0u128..=48_700_000_000_000_000_000_000_000_000_000u128) {
        let x = U256::from(x);
        prop_assert!(x <= SAFE_LARGE_POW3_THRESHOLD);
        prop_assert_eq!(split_pow3_down(x), naive_pow3_down(x));
    }

    #[test]
    fn prop_split_cube_handles_large_operands(
        x in 48_700_000_000_000_000_000_000_000_000_001u128..=48_000_000_000_000_000_000_000_000_000_000_000_000u128,
    ) {
        let x = U256::from(x);
        let Ok(cube) = split_pow3_down(x) else {
            return Err(TestCaseError::fail(format!("split cube overflowed for {x}")));
        };
        // x³ / 1e36 is at least x when x >= 1e18.
        prop_assert!(cube >= x);
        let Ok(squared) = mul_down(x, x) else {
            return Err(TestCaseError::fail(format!("square overflowed for {x}")));
        };
        prop_assert_eq!(Ok(cube), wide_mul_div_down(squared, x, ONE));
    }
}

// ---------------------------------------------------------------------------
// Property 2: Swap round trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_weighted(
        bi in balance_strategy(),
        bo in balance_strategy(),
        share in share_strategy(),
        weight_in in prop::sample::select(vec![2_000u32, 5_000, 8_000]),
    ) {
        let amount_in = (bi / 1_000_000 * share).max(1);
        let pool = make_weighted(bi, bo, weight_in);
        let Some(back) = round_trip(&pool, amount_in) else {
            return Ok(());
        };
        prop_assert!(
            within_round_trip_tolerance(back, amount_in, bi),
            "weighted round trip drifted: in={} back={}", amount_in, back
        );
    }

    #[test]
    fn prop_round_trip_stable(
        bi in E18..=100_000_000 * E18,
        skew in 34u128..=300u128,
        share in share_strategy(),
        amp in 1u64..=5_000u64,
    ) {
        // bo within [bi / 3, 3 bi].
        let bo = bi / 100 * skew;
        let amount_in = (bi / 1_000_000 * share).max(1_000_000);
        let pool = make_stable(bi, bo, amp);
        let Some(back) = round_trip(&pool, amount_in) else {
            return Ok(());
        };
        prop_assert!(
            within_round_trip_tolerance(back, amount_in, bi),
            "stable round trip drifted: in={} back={}", amount_in, back
        );
    }

    #[test]
    fn prop_round_trip_three_clp(
        bi in balance_strategy(),
        bo in balance_strategy(),
        third in balance_strategy(),
        share in share_strategy(),
        root3_alpha in root3_alpha_strategy(),
    ) {
        let amount_in = (bi / 1_000_000 * share).max(1);
        let pool = make_three_clp([bi, bo, third], root3_alpha);
        let Some(back) = round_trip(&pool, amount_in) else {
            return Ok(());
        };
        prop_assert!(
            within_round_trip_tolerance(back, amount_in, bi),
            "three-clp round trip drifted: in={} back={}", amount_in, back
        );
    }
}

// ---------------------------------------------------------------------------
// Property 3: Newton warm start
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_warm_start_three_clp(
        balances in [balance_strategy(), balance_strategy(), balance_strategy()],
        root3_alpha in root3_alpha_strategy(),
    ) {
        let ctx = MathContext::default();
        let pool = make_three_clp(balances, root3_alpha);
        let Ok(first) = pool.invariant_solution(&ctx) else {
            return Ok(());
        };
        let Ok(again) = pool.invariant_from(&ctx, first.root()) else {
            return Err(TestCaseError::fail("warm start failed"));
        };
        prop_assert!(again.steps() <= 1, "warm start took {} steps", again.steps());
    }

    #[test]
    fn prop_warm_start_stable(
        bi in E18..=100_000_000 * E18,
        skew in 34u128..=300u128,
        amp in 1u64..=5_000u64,
    ) {
        let ctx = MathContext::default();
        let pool = make_stable(bi, bi / 100 * skew, amp);
        let Ok(first) = pool.invariant_solution(&ctx) else {
            return Ok(());
        };
        let Ok(again) = pool.invariant_from(&ctx, first.root()) else {
            return Err(TestCaseError::fail("warm start failed"));
        };
        prop_assert!(again.steps() <= 1, "warm start took {} steps", again.steps());
    }
}

// ---------------------------------------------------------------------------
// Property 4: Allocation invariants
// ---------------------------------------------------------------------------

/// Constant-product curve `(reserve_in, reserve_out)` in whole tokens.
fn curve_strategy() -> impl Strategy<Value = (u128, u128)> {
    (1u128..=10_000u128, 1u128..=10_000u128)
}

fn cp_quote(reserve_in: u128, reserve_out: u128, x: Amount) -> Amount {
    let (a, b) = (U256::from(reserve_in * E18), U256::from(reserve_out * E18));
    Amount::new(b * x.get() / (a + x.get()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_allocation_sums_and_respects_limits(
        curves in prop::collection::vec(curve_strategy(), 1..=4),
        limit_shares in prop::collection::vec(1u128..=100u128, 4),
        total_share in 1u128..=100u128,
    ) {
        let limits: Vec<Amount> = curves
            .iter()
            .zip(&limit_shares)
            .map(|(&(a, _), &s)| Amount::from_u128(a * E18 / 100 * s))
            .collect();
        let capacity = limits.iter().fold(0u128, |acc, l| acc + l.get().to::<u128>());
        let total = (capacity / 100 * total_share).max(1);

        let Ok(alloc) = allocate(
            SwapType::ExactIn,
            Amount::from_u128(total),
            &limits,
            &AllocatorParams::default(),
            |i, x| {
                let (a, b) = curves.get(i).copied().unwrap_or((1, 1));
                Ok(cp_quote(a, b, x))
            },
        ) else {
            return Err(TestCaseError::fail("allocation failed within capacity"));
        };

        prop_assert_eq!(alloc.placed(), U256::from(total));
        for (amount, limit) in alloc.amounts.iter().zip(&limits) {
            prop_assert!(amount <= limit);
        }

        // Never worse than the best single path able to take everything.
        for (i, (&(a, b), limit)) in curves.iter().zip(&limits).enumerate() {
            if limit.get() >= U256::from(total) {
                let single = cp_quote(a, b, Amount::from_u128(total));
                prop_assert!(
                    alloc.total_return() >= single.get(),
                    "path {} alone beats the blend", i
                );
            }
        }
    }
}
