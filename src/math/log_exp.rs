//! Fixed-point `ln`, `exp` and `pow` matching the on-chain weighted-pool
//! math bit for bit.
//!
//! Both functions decompose their argument against a table of
//! precomputed powers of `e` and finish with a short Taylor (for `exp`) or
//! `atanh` (for `ln`) series.  Arguments close to one take a 36-decimal
//! `ln` path for extra precision.
//!
//! Signed intermediates are carried as sign and magnitude over [`U256`];
//! every division truncates towards zero, which is what signed integer
//! division does on chain.

use alloy_primitives::{uint, U256};

use crate::error::{Result, RouterError};

const ONE_18: U256 = uint!(1_000_000_000_000_000_000_U256);
const ONE_20: U256 = uint!(100_000_000_000_000_000_000_U256);
const ONE_36: U256 = uint!(1_000_000_000_000_000_000_000_000_000_000_000_000_U256);

const MAX_NATURAL_EXPONENT: U256 = uint!(130_000_000_000_000_000_000_U256);
const MIN_NATURAL_EXPONENT_ABS: U256 = uint!(41_000_000_000_000_000_000_U256);

const LN_36_LOWER_BOUND: U256 = uint!(900_000_000_000_000_000_U256);
const LN_36_UPPER_BOUND: U256 = uint!(1_100_000_000_000_000_000_U256);

/// `2^254 / ONE_20`; larger exponents could overflow `ln(x) · y`.
const MILD_EXPONENT_BOUND: U256 =
    uint!(289_480_223_093_290_488_558_927_462_521_719_769_633_174_961_664_101_410_098_U256);

// 18 decimal constants: x0 = 2^7, a0 = e^(x0); x1 = 2^6, a1 = e^(x1)
const X0: U256 = uint!(128_000_000_000_000_000_000_U256);
const A0: U256 = uint!(38_877_084_059_945_950_922_200_000_000_000_000_000_000_000_000_U256);
const X1: U256 = uint!(64_000_000_000_000_000_000_U256);
const A1: U256 = uint!(6_235_149_080_811_616_882_910_000_000_U256);

// 20 decimal constants: x2 = 2^5 down to x11 = 2^-4, a_n = e^(x_n)
const X2: U256 = uint!(3_200_000_000_000_000_000_000_U256);
const A2: U256 = uint!(7_896_296_018_268_069_516_100_000_000_000_000_U256);
const X3: U256 = uint!(1_600_000_000_000_000_000_000_U256);
const A3: U256 = uint!(888_611_052_050_787_263_676_000_000_U256);
const X4: U256 = uint!(800_000_000_000_000_000_000_U256);
const A4: U256 = uint!(298_095_798_704_172_827_474_000_U256);
const X5: U256 = uint!(400_000_000_000_000_000_000_U256);
const A5: U256 = uint!(5_459_815_003_314_423_907_810_U256);
const X6: U256 = uint!(200_000_000_000_000_000_000_U256);
const A6: U256 = uint!(738_905_609_893_065_022_723_U256);
const X7: U256 = uint!(100_000_000_000_000_000_000_U256);
const A7: U256 = uint!(271_828_182_845_904_523_536_U256);
const X8: U256 = uint!(50_000_000_000_000_000_000_U256);
const A8: U256 = uint!(164_872_127_070_012_814_685_U256);
const X9: U256 = uint!(25_000_000_000_000_000_000_U256);
const A9: U256 = uint!(128_402_541_668_774_148_407_U256);
const X10: U256 = uint!(12_500_000_000_000_000_000_U256);
const A10: U256 = uint!(113_314_845_306_682_631_683_U256);
const X11: U256 = uint!(6_250_000_000_000_000_000_U256);
const A11: U256 = uint!(106_449_445_891_785_942_956_U256);

/// Table rows used by `exp` (x2..x9).
const EXP_TABLE: [(U256, U256); 8] = [
    (X2, A2),
    (X3, A3),
    (X4, A4),
    (X5, A5),
    (X6, A6),
    (X7, A7),
    (X8, A8),
    (X9, A9),
];

/// Table rows used by `ln` (x2..x11).
const LN_TABLE: [(U256, U256); 10] = [
    (X2, A2),
    (X3, A3),
    (X4, A4),
    (X5, A5),
    (X6, A6),
    (X7, A7),
    (X8, A8),
    (X9, A9),
    (X10, A10),
    (X11, A11),
];

/// Sign and magnitude of an 18-decimal signed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Signed {
    negative: bool,
    magnitude: U256,
}

impl Signed {
    const fn positive(magnitude: U256) -> Self {
        Self {
            negative: false,
            magnitude,
        }
    }

    const fn negate(self) -> Self {
        Self {
            negative: !self.negative,
            magnitude: self.magnitude,
        }
    }
}

fn checked_mul(a: U256, b: U256, what: &'static str) -> Result<U256> {
    a.checked_mul(b).ok_or(RouterError::Overflow(what))
}

fn checked_add(a: U256, b: U256, what: &'static str) -> Result<U256> {
    a.checked_add(b).ok_or(RouterError::Overflow(what))
}

/// `x^y` for 18-decimal `x` and `y`, computed as `exp(y · ln(x))`.
///
/// The result carries a relative error well below `1e-14`; callers that
/// need a directional bound use
/// [`pow_down`](super::fixed_point::pow_down) /
/// [`pow_up`](super::fixed_point::pow_up).
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] if `x ≥ 2^255`, if `y` is above the
/// mild exponent bound, or if `y · ln(x)` leaves `[-41, 130]`.
pub fn pow(x: U256, y: U256) -> Result<U256> {
    if y.is_zero() {
        return Ok(ONE_18);
    }
    if x.is_zero() {
        return Ok(U256::ZERO);
    }
    if x.bit(255) {
        return Err(RouterError::Overflow("pow: base out of bounds"));
    }
    if y >= MILD_EXPONENT_BOUND {
        return Err(RouterError::Overflow("pow: exponent out of bounds"));
    }

    let logx_times_y = if LN_36_LOWER_BOUND < x && x < LN_36_UPPER_BOUND {
        let ln_36_x = ln_36(x)?;
        // ln_36_x carries 36 decimals; split it so the product with y fits.
        let whole = checked_mul(ln_36_x.magnitude / ONE_18, y, "pow: ln36 whole")?;
        let frac = checked_mul(ln_36_x.magnitude % ONE_18, y, "pow: ln36 frac")? / ONE_18;
        Signed {
            negative: ln_36_x.negative,
            magnitude: checked_add(whole, frac, "pow: ln36 sum")?,
        }
    } else {
        let ln_x = ln(x)?;
        Signed {
            negative: ln_x.negative,
            magnitude: checked_mul(ln_x.magnitude, y, "pow: ln times y")?,
        }
    };
    let exponent = Signed {
        negative: logx_times_y.negative,
        magnitude: logx_times_y.magnitude / ONE_18,
    };

    let in_range = if exponent.negative {
        exponent.magnitude <= MIN_NATURAL_EXPONENT_ABS
    } else {
        exponent.magnitude <= MAX_NATURAL_EXPONENT
    };
    if !in_range {
        return Err(RouterError::Overflow("pow: product out of bounds"));
    }
    exp_signed(exponent)
}

/// `e^x` for a non-negative 18-decimal `x ≤ 130`.
///
/// # Errors
///
/// Returns [`RouterError::Overflow`] if `x` exceeds the natural exponent
/// bound.
pub fn exp(x: U256) -> Result<U256> {
    if x > MAX_NATURAL_EXPONENT {
        return Err(RouterError::Overflow("exp: argument out of bounds"));
    }
    exp_signed(Signed::positive(x))
}

fn exp_signed(x: Signed) -> Result<U256> {
    if x.negative {
        if x.magnitude > MIN_NATURAL_EXPONENT_ABS {
            return Err(RouterError::Overflow("exp: argument out of bounds"));
        }
        // e^(-x) = 1 / e^x, rounded down like the on-chain division.
        let positive = exp_signed(x.negate())?;
        return (ONE_18 * ONE_18)
            .checked_div(positive)
            .ok_or(RouterError::DivisionByZero);
    }

    let mut x = x.magnitude;
    let first_an = if x >= X0 {
        x -= X0;
        A0
    } else if x >= X1 {
        x -= X1;
        A1
    } else {
        U256::from(1u8)
    };

    // Switch to 20 decimals for the remaining table steps.
    x = checked_mul(x, U256::from(100u8), "exp: rescale")?;

    let mut product = ONE_20;
    for (xn, an) in EXP_TABLE {
        if x >= xn {
            x -= xn;
            product = checked_mul(product, an, "exp: table product")? / ONE_20;
        }
    }

    // Taylor series up to the 12th term; x < 0.25 here.
    let mut series_sum = ONE_20 + x;
    let mut term = x;
    for n in 2u8..=12 {
        term = checked_mul(term, x, "exp: series term")? / ONE_20 / U256::from(n);
        series_sum += term;
    }

    let scaled = checked_mul(product, series_sum, "exp: product times series")? / ONE_20;
    Ok(checked_mul(scaled, first_an, "exp: first factor")? / U256::from(100u8))
}

/// Natural logarithm of an 18-decimal `a > 0`, 18-decimal result.
fn ln(a: U256) -> Result<Signed> {
    if a.is_zero() {
        return Err(RouterError::DivisionByZero);
    }
    if a < ONE_18 {
        // ln(a) = -ln(1 / a)
        let inverse = (ONE_18 * ONE_18) / a;
        return Ok(ln(inverse)?.negate());
    }

    let mut a = a;
    let mut sum = U256::ZERO;
    if a >= checked_mul(A0, ONE_18, "ln: a0 bound")? {
        a /= A0;
        sum += X0;
    }
    if a >= A1 * ONE_18 {
        a /= A1;
        sum += X1;
    }

    // Switch to 20 decimals.
    sum *= U256::from(100u8);
    a = checked_mul(a, U256::from(100u8), "ln: rescale")?;

    for (xn, an) in LN_TABLE {
        if a >= an {
            a = checked_mul(a, ONE_20, "ln: table step")? / an;
            sum += xn;
        }
    }

    // atanh series: ln(a) = 2 · (z + z³/3 + z⁵/5 + ...), z = (a − 1)/(a + 1)
    let z = checked_mul(a - ONE_20, ONE_20, "ln: z numerator")? / (a + ONE_20);
    let z_squared = (z * z) / ONE_20;

    let mut num = z;
    let mut series_sum = num;
    for divisor in [3u8, 5, 7, 9, 11] {
        num = (num * z_squared) / ONE_20;
        series_sum += num / U256::from(divisor);
    }
    series_sum *= U256::from(2u8);

    Ok(Signed::positive((sum + series_sum) / U256::from(100u8)))
}

/// High-precision `ln` for arguments near one, 36-decimal result.
fn ln_36(x: U256) -> Result<Signed> {
    let x = checked_mul(x, ONE_18, "ln36: rescale")?;
    let negative = x < ONE_36;
    let distance = if negative { ONE_36 - x } else { x - ONE_36 };

    let z = checked_mul(distance, ONE_36, "ln36: z numerator")? / (x + ONE_36);
    let z_squared = (z * z) / ONE_36;

    let mut num = z;
    let mut series_sum = num;
    for divisor in [3u8, 5, 7, 9, 11, 13, 15] {
        num = (num * z_squared) / ONE_36;
        series_sum += num / U256::from(divisor);
    }

    Ok(Signed {
        negative,
        magnitude: series_sum * U256::from(2u8),
    })
}
