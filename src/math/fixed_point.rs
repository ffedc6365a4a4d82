//! 18-decimal fixed-point arithmetic over [`U256`].
//!
//! Every amount inside the pool math is an unsigned integer scaled by
//! [`ONE`] (`1e18`), matching the arithmetic that settles on chain.  All
//! operations are checked and every multiply or divide names its rounding
//! direction, either through the `_down` / `_up` suffix or an explicit
//! [`Rounding`] argument.
//!
//! # Operations
//!
//! | Function | Result |
//! |----------|--------|
//! | [`mul_down`] / [`mul_up`] | `a · b / ONE`, floor / ceiling |
//! | [`div_down`] / [`div_up`] | `a · ONE / b`, floor / ceiling |
//! | [`complement`] | `ONE − x`, clamped at zero |
//! | [`pow3`] | `x³` in fixed point, overflow-safe for large `x` |
//! | [`pow_down`] / [`pow_up`] | `x^y` with a bounded relative error |
//! | [`sqrt`] | `√x` in fixed point |
//!
//! # Large cubes
//!
//! `mul_down(mul_down(x, x), x)` overflows once `x²` exceeds 256 bits
//! before the scale is divided back out.  Above
//! [`SAFE_LARGE_POW3_THRESHOLD`](super::constants::SAFE_LARGE_POW3_THRESHOLD)
//! [`pow3`] splits both `x` and `mul_down(x, x)` at
//! [`MIDDECIMAL`](super::constants::MIDDECIMAL) and recombines the four
//! partial products, so it only fails when the cube itself does not fit.
//! Below the threshold both paths return the same value.
//!
//! Quotients whose numerator alone exceeds 256 bits go through
//! [`wide_mul_div_down`], which holds the product in 512 bits.

use alloy_primitives::ruint::Uint;
use alloy_primitives::{uint, U256};
use rust_decimal::Decimal;

use super::constants::{MAX_POW_RELATIVE_ERROR, MIDDECIMAL, SAFE_LARGE_POW3_THRESHOLD};
use super::div_round;
use super::log_exp;
use crate::domain::Rounding;
use crate::error::{Result, RouterError};

/// Fixed-point one (`1e18`).
pub const ONE: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Fixed-point two.
const TWO: U256 = uint!(2_000_000_000_000_000_000_U256);

/// Fixed-point four.
const FOUR: U256 = uint!(4_000_000_000_000_000_000_U256);

// ---------------------------------------------------------------------------
// Multiplication and division
// ---------------------------------------------------------------------------

/// `a · b / ONE`, rounded down.
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] if `a · b` exceeds 256 bits.
pub fn mul_down(a: U256, b: U256) -> Result<U256> {
    let product = a
        .checked_mul(b)
        .ok_or(RouterError::Overflow("mul_down product"))?;
    Ok(product / ONE)
}

/// `a · b / ONE`, rounded up.
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] if `a · b` exceeds 256 bits.
pub fn mul_up(a: U256, b: U256) -> Result<U256> {
    let product = a
        .checked_mul(b)
        .ok_or(RouterError::Overflow("mul_up product"))?;
    if product.is_zero() {
        return Ok(U256::ZERO);
    }
    Ok((product - U256::from(1u8)) / ONE + U256::from(1u8))
}

/// `a · ONE / b`, rounded down.
///
/// # Errors
///
/// - [`RouterError::DivisionByZero`] if `b` is zero.
/// - [`RouterError::Overflow`] if `a · ONE` exceeds 256 bits.
pub fn div_down(a: U256, b: U256) -> Result<U256> {
    div(a, b, Rounding::Down)
}

/// `a · ONE / b`, rounded up.
///
/// # Errors
///
/// - [`RouterError::DivisionByZero`] if `b` is zero.
/// - [`RouterError::Overflow`] if `a · ONE` exceeds 256 bits.
pub fn div_up(a: U256, b: U256) -> Result<U256> {
    div(a, b, Rounding::Up)
}

/// `a · b / ONE` with an explicit rounding direction.
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] if `a · b` exceeds 256 bits.
pub fn mul(a: U256, b: U256, rounding: Rounding) -> Result<U256> {
    match rounding {
        Rounding::Down => mul_down(a, b),
        Rounding::Up => mul_up(a, b),
    }
}

/// `a · ONE / b` with an explicit rounding direction.
///
/// # Errors
///
/// - [`RouterError::DivisionByZero`] if `b` is zero.
/// - [`RouterError::Overflow`] if `a · ONE` exceeds 256 bits.
pub fn div(a: U256, b: U256, rounding: Rounding) -> Result<U256> {
    if b.is_zero() {
        return Err(RouterError::DivisionByZero);
    }
    if a.is_zero() {
        return Ok(U256::ZERO);
    }
    let scaled = a
        .checked_mul(ONE)
        .ok_or(RouterError::Overflow("div numerator"))?;
    div_round(scaled, b, rounding).ok_or(RouterError::DivisionByZero)
}

/// Raw `a · b / c` without fixed-point scaling.
///
/// # Errors
///
/// - [`RouterError::DivisionByZero`] if `c` is zero.
/// - [`RouterError::Overflow`] if `a · b` exceeds 256 bits.
pub fn mul_div(a: U256, b: U256, c: U256, rounding: Rounding) -> Result<U256> {
    let product = a
        .checked_mul(b)
        .ok_or(RouterError::Overflow("mul_div product"))?;
    div_round(product, c, rounding).ok_or(RouterError::DivisionByZero)
}

/// 512-bit intermediate for [`wide_mul_div_down`].
type Wide = Uint<512, 8>;

fn widen(x: U256) -> Wide {
    let [a, b, c, d] = *x.as_limbs();
    Wide::from_limbs([a, b, c, d, 0, 0, 0, 0])
}

fn narrow(x: Wide, context: &'static str) -> Result<U256> {
    let [a, b, c, d, e, f, g, h] = *x.as_limbs();
    if (e | f | g | h) != 0 {
        return Err(RouterError::Overflow(context));
    }
    Ok(U256::from_limbs([a, b, c, d]))
}

/// Raw `a · b / c` rounded down, with `a · b` held in 512 bits.
///
/// # Errors
///
/// - [`RouterError::DivisionByZero`] if `c` is zero.
/// - [`RouterError::Overflow`] if the quotient exceeds 256 bits.
pub fn wide_mul_div_down(a: U256, b: U256, c: U256) -> Result<U256> {
    if c.is_zero() {
        return Err(RouterError::DivisionByZero);
    }
    narrow(widen(a) * widen(b) / widen(c), "wide mul_div quotient")
}

/// `ONE − x`, or zero when `x ≥ ONE`.
#[must_use]
pub fn complement(x: U256) -> U256 {
    if x < ONE {
        ONE - x
    } else {
        U256::ZERO
    }
}

// ---------------------------------------------------------------------------
// Cubes
// ---------------------------------------------------------------------------

/// `x³` in fixed point, rounded down.
///
/// Dispatches to [`naive_pow3_down`] up to the safe threshold and to
/// [`split_pow3_down`] above it.
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] if the cube exceeds 256 bits (`x`
/// above roughly `4.87e37`).
pub fn pow3(x: U256) -> Result<U256> {
    if x <= SAFE_LARGE_POW3_THRESHOLD {
        naive_pow3_down(x)
    } else {
        split_pow3_down(x)
    }
}

/// `mul_down(mul_down(x, x), x)`.
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] when `x² · x` exceeds 256 bits.
pub fn naive_pow3_down(x: U256) -> Result<U256> {
    mul_down(mul_down(x, x)?, x)
}

/// `x³` computed by splitting `x` and `x² = mul_down(x, x)` at
/// [`MIDDECIMAL`].
///
/// With `x = xh · MID + xl` and `x² = sh · MID + sl`, and `MID² = ONE`:
///
/// ```text
/// x²·x / ONE = sh·xh + ((sh·xl + sl·xh) · MID + sl·xl) / ONE
/// ```
///
/// The first term is at most the result and the others stay below `x²`,
/// so the computation fits in 256 bits whenever the cube does.  The result
/// is bit-identical to [`naive_pow3_down`] whenever the latter does not
/// overflow.
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] if `x²` or the cube exceeds 256 bits.
pub fn split_pow3_down(x: U256) -> Result<U256> {
    let squared = mul_down(x, x)?;
    let (sh, sl) = (squared / MIDDECIMAL, squared % MIDDECIMAL);
    let (xh, xl) = (x / MIDDECIMAL, x % MIDDECIMAL);

    let high = sh
        .checked_mul(xh)
        .ok_or(RouterError::Overflow("pow3 high product"))?;
    let cross = (sh * xl)
        .checked_add(sl * xh)
        .ok_or(RouterError::Overflow("pow3 cross products"))?;
    let middle = cross
        .checked_mul(MIDDECIMAL)
        .and_then(|c| c.checked_add(sl * xl))
        .ok_or(RouterError::Overflow("pow3 middle term"))?;

    high.checked_add(middle / ONE)
        .ok_or(RouterError::Overflow("pow3 result"))
}

// ---------------------------------------------------------------------------
// Powers and roots
// ---------------------------------------------------------------------------

/// `x^y` rounded down, with the exact shortcuts for `y ∈ {1, 2, 4}`.
///
/// The general case subtracts the maximum relative error of
/// [`log_exp::pow`] so the result never exceeds the true power.
///
/// # Errors
///
/// Propagates overflow and domain errors from [`log_exp::pow`].
pub fn pow_down(x: U256, y: U256) -> Result<U256> {
    if y == ONE {
        return Ok(x);
    }
    if y == TWO {
        return mul_down(x, x);
    }
    if y == FOUR {
        let square = mul_down(x, x)?;
        return mul_down(square, square);
    }
    let raw = log_exp::pow(x, y)?;
    let max_error = mul_up(raw, MAX_POW_RELATIVE_ERROR)? + U256::from(1u8);
    Ok(raw.saturating_sub(max_error))
}

/// `x^y` rounded up, with the exact shortcuts for `y ∈ {1, 2, 4}`.
///
/// # Errors
///
/// Propagates overflow and domain errors from [`log_exp::pow`].
pub fn pow_up(x: U256, y: U256) -> Result<U256> {
    if y == ONE {
        return Ok(x);
    }
    if y == TWO {
        return mul_up(x, x);
    }
    if y == FOUR {
        let square = mul_up(x, x)?;
        return mul_up(square, square);
    }
    let raw = log_exp::pow(x, y)?;
    let max_error = mul_up(raw, MAX_POW_RELATIVE_ERROR)? + U256::from(1u8);
    raw.checked_add(max_error)
        .ok_or(RouterError::Overflow("pow_up error margin"))
}

/// Fixed-point square root: `√(x · ONE)` as an integer.
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] if `x · ONE` exceeds 256 bits.
pub fn sqrt(x: U256, rounding: Rounding) -> Result<U256> {
    let radicand = x
        .checked_mul(ONE)
        .ok_or(RouterError::Overflow("sqrt radicand"))?;
    let root = isqrt(radicand);
    if rounding.is_up() && root * root < radicand {
        return Ok(root + U256::from(1u8));
    }
    Ok(root)
}

/// Converts a non-negative decimal to 18-decimal fixed point, rounding
/// any digits beyond the 18th in the given direction.
///
/// # Errors
///
/// Returns [`RouterError::InvalidInput`] if `value` is negative.
pub fn from_decimal(value: Decimal, rounding: Rounding) -> Result<U256> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(RouterError::InvalidInput("decimal must be non-negative"));
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let scale = value.scale();
    if scale <= 18 {
        let factor = U256::from(10u8).pow(U256::from(18 - scale));
        mantissa
            .checked_mul(factor)
            .ok_or(RouterError::Overflow("decimal to fixed"))
    } else {
        let divisor = U256::from(10u8).pow(U256::from(scale - 18));
        div_round(mantissa, divisor, rounding).ok_or(RouterError::DivisionByZero)
    }
}

/// Converts 18-decimal fixed point to a [`Decimal`] for display,
/// saturating at [`Decimal::MAX`].
#[must_use]
pub fn to_decimal(value: U256) -> Decimal {
    let whole = value / ONE;
    let frac = value % ONE;
    let (Ok(whole), Ok(frac)) = (u64::try_from(whole), u64::try_from(frac)) else {
        return Decimal::MAX;
    };
    Decimal::from(whole) + Decimal::from_i128_with_scale(i128::from(frac), 18)
}

/// Integer square root (floor) via Newton's method.
#[must_use]
pub fn isqrt(n: U256) -> U256 {
    if n.is_zero() {
        return U256::ZERO;
    }
    // Start at a power of two at or above √n so the iterates decrease.
    let shift = n.bit_len().div_ceil(2);
    let mut x = U256::from(1u8) << shift;
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}
