//! Routes a WETH sale over a small mainnet-style pool dump.
//!
//! Loads `demos/pools.json` (or the file given as the first argument),
//! routes 25 WETH to USDC over direct and two-hop paths, and prints the
//! route as JSON.  Set `RUST_LOG=smart_order_router=debug` to watch the
//! proposal and allocation stages.
//!
//! # Run
//!
//! ```bash
//! cargo run --example route_pools
//! cargo run --example route_pools -- path/to/pools.json
//! ```

use smart_order_router::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_DUMP: &str = include_str!("pools.json");
const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 1. Load the snapshot ────────────────────────────────────────────
    let dump = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEFAULT_DUMP.to_owned(),
    };
    let snapshot = PoolSnapshot::from_json(&dump)?;
    println!("Loaded {} pools", snapshot.len());

    // ── 2. Configure the router ─────────────────────────────────────────
    let config = RouterConfig::from_toml_str(
        r#"
        max_pools = 4
        max_hops = 2
        allocation_steps = 200
        "#,
    )?;
    let router = Router::new(config)?;

    // ── 3. Route 25 WETH to USDC ────────────────────────────────────────
    let weth: TokenId = WETH.parse()?;
    let usdc: TokenId = USDC.parse()?;
    let spec = SwapSpec::exact_in(Amount::from_u128(25_000_000_000_000_000_000))?;
    let route = router.route(&snapshot, weth, usdc, spec)?;

    for share in &route.paths {
        println!(
            "  {:<40} in {:>26}  out {:>14}",
            share.path.to_string(),
            share.amount,
            share.result
        );
    }
    println!("Total out: {} (raw USDC units)\n", route.return_amount);

    // ── 4. Print the full result ────────────────────────────────────────
    println!("{}", serde_json::to_string_pretty(&route)?);
    Ok(())
}
