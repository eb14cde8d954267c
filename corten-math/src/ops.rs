// Copyright (c) 2025 The Corten contributors
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Pure numeric operations for WebAssembly instructions.
//!
//! Integer division and float-to-integer truncation return `Result`
//! because the Wasm spec defines traps for them; everything else is
//! total. Float operations work on [`FloatBits32`]/[`FloatBits64`] so
//! that callers never lose NaN payloads by accident, and every
//! arithmetic result that is a NaN is canonicalised. `abs`, `neg`, and
//! `copysign` are sign-bit manipulations and preserve payloads exactly.

use crate::prelude::{codes, Error, FloatBits32, FloatBits64, Result};

const DIVIDE_BY_ZERO: Error =
    Error::trap(codes::DIVISION_BY_ZERO, "integer divide by zero");
const OVERFLOW: Error = Error::trap(codes::INTEGER_OVERFLOW, "integer overflow");
const BAD_CONVERSION: Error = Error::trap(
    codes::INVALID_CONVERSION_TO_INTEGER,
    "invalid conversion to integer",
);

// Rounding primitives. The std paths lower to the obvious intrinsics;
// without std the same operations come from libm.
#[cfg(feature = "std")]
mod rounding {
    pub fn trunc_f32(x: f32) -> f32 {
        x.trunc()
    }
    pub fn trunc_f64(x: f64) -> f64 {
        x.trunc()
    }
    pub fn ceil_f32(x: f32) -> f32 {
        x.ceil()
    }
    pub fn ceil_f64(x: f64) -> f64 {
        x.ceil()
    }
    pub fn floor_f32(x: f32) -> f32 {
        x.floor()
    }
    pub fn floor_f64(x: f64) -> f64 {
        x.floor()
    }
    pub fn round_f32(x: f32) -> f32 {
        x.round()
    }
    pub fn round_f64(x: f64) -> f64 {
        x.round()
    }
    pub fn sqrt_f32(x: f32) -> f32 {
        x.sqrt()
    }
    pub fn sqrt_f64(x: f64) -> f64 {
        x.sqrt()
    }
}

#[cfg(not(feature = "std"))]
mod rounding {
    pub fn trunc_f32(x: f32) -> f32 {
        libm::truncf(x)
    }
    pub fn trunc_f64(x: f64) -> f64 {
        libm::trunc(x)
    }
    pub fn ceil_f32(x: f32) -> f32 {
        libm::ceilf(x)
    }
    pub fn ceil_f64(x: f64) -> f64 {
        libm::ceil(x)
    }
    pub fn floor_f32(x: f32) -> f32 {
        libm::floorf(x)
    }
    pub fn floor_f64(x: f64) -> f64 {
        libm::floor(x)
    }
    pub fn round_f32(x: f32) -> f32 {
        libm::roundf(x)
    }
    pub fn round_f64(x: f64) -> f64 {
        libm::round(x)
    }
    pub fn sqrt_f32(x: f32) -> f32 {
        libm::sqrtf(x)
    }
    pub fn sqrt_f64(x: f64) -> f64 {
        libm::sqrt(x)
    }
}

fn canon_f32(x: f32) -> FloatBits32 {
    if x.is_nan() {
        FloatBits32::NAN
    } else {
        FloatBits32::from_float(x)
    }
}

fn canon_f64(x: f64) -> FloatBits64 {
    if x.is_nan() {
        FloatBits64::NAN
    } else {
        FloatBits64::from_float(x)
    }
}

// ---------------------------------------------------------------------
// Integer division and remainder
// ---------------------------------------------------------------------

/// `i32.div_s`: traps on zero divisor and on `i32::MIN / -1`.
pub fn i32_div_s(lhs: i32, rhs: i32) -> Result<i32> {
    if rhs == 0 {
        return Err(DIVIDE_BY_ZERO);
    }
    if lhs == i32::MIN && rhs == -1 {
        return Err(OVERFLOW);
    }
    Ok(lhs.wrapping_div(rhs))
}

/// `i32.div_u`: traps on zero divisor.
pub fn i32_div_u(lhs: u32, rhs: u32) -> Result<u32> {
    if rhs == 0 {
        return Err(DIVIDE_BY_ZERO);
    }
    Ok(lhs / rhs)
}

/// `i32.rem_s`: traps on zero divisor; `i32::MIN % -1` is defined as 0.
pub fn i32_rem_s(lhs: i32, rhs: i32) -> Result<i32> {
    if rhs == 0 {
        return Err(DIVIDE_BY_ZERO);
    }
    Ok(lhs.wrapping_rem(rhs))
}

/// `i32.rem_u`: traps on zero divisor.
pub fn i32_rem_u(lhs: u32, rhs: u32) -> Result<u32> {
    if rhs == 0 {
        return Err(DIVIDE_BY_ZERO);
    }
    Ok(lhs % rhs)
}

/// `i64.div_s`: traps on zero divisor and on `i64::MIN / -1`.
pub fn i64_div_s(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs == 0 {
        return Err(DIVIDE_BY_ZERO);
    }
    if lhs == i64::MIN && rhs == -1 {
        return Err(OVERFLOW);
    }
    Ok(lhs.wrapping_div(rhs))
}

/// `i64.div_u`: traps on zero divisor.
pub fn i64_div_u(lhs: u64, rhs: u64) -> Result<u64> {
    if rhs == 0 {
        return Err(DIVIDE_BY_ZERO);
    }
    Ok(lhs / rhs)
}

/// `i64.rem_s`: traps on zero divisor; `i64::MIN % -1` is defined as 0.
pub fn i64_rem_s(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs == 0 {
        return Err(DIVIDE_BY_ZERO);
    }
    Ok(lhs.wrapping_rem(rhs))
}

/// `i64.rem_u`: traps on zero divisor.
pub fn i64_rem_u(lhs: u64, rhs: u64) -> Result<u64> {
    if rhs == 0 {
        return Err(DIVIDE_BY_ZERO);
    }
    Ok(lhs % rhs)
}

// ---------------------------------------------------------------------
// Float arithmetic
// ---------------------------------------------------------------------

/// `f32.add`
pub fn f32_add(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    canon_f32(lhs.value() + rhs.value())
}

/// `f32.sub`
pub fn f32_sub(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    canon_f32(lhs.value() - rhs.value())
}

/// `f32.mul`
pub fn f32_mul(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    canon_f32(lhs.value() * rhs.value())
}

/// `f32.div`
pub fn f32_div(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    canon_f32(lhs.value() / rhs.value())
}

/// `f64.add`
pub fn f64_add(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    canon_f64(lhs.value() + rhs.value())
}

/// `f64.sub`
pub fn f64_sub(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    canon_f64(lhs.value() - rhs.value())
}

/// `f64.mul`
pub fn f64_mul(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    canon_f64(lhs.value() * rhs.value())
}

/// `f64.div`
pub fn f64_div(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    canon_f64(lhs.value() / rhs.value())
}

/// `f32.min`: propagates NaN; `min(-0, +0)` is `-0`.
pub fn f32_min(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    let (a, b) = (lhs.value(), rhs.value());
    if a.is_nan() || b.is_nan() {
        return FloatBits32::NAN;
    }
    if a == b {
        // Equal except possibly for the zero sign: OR keeps -0.
        return FloatBits32::from_bits(lhs.to_bits() | rhs.to_bits());
    }
    FloatBits32::from_float(if a < b { a } else { b })
}

/// `f32.max`: propagates NaN; `max(-0, +0)` is `+0`.
pub fn f32_max(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    let (a, b) = (lhs.value(), rhs.value());
    if a.is_nan() || b.is_nan() {
        return FloatBits32::NAN;
    }
    if a == b {
        return FloatBits32::from_bits(lhs.to_bits() & rhs.to_bits());
    }
    FloatBits32::from_float(if a > b { a } else { b })
}

/// `f64.min`: propagates NaN; `min(-0, +0)` is `-0`.
pub fn f64_min(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    let (a, b) = (lhs.value(), rhs.value());
    if a.is_nan() || b.is_nan() {
        return FloatBits64::NAN;
    }
    if a == b {
        return FloatBits64::from_bits(lhs.to_bits() | rhs.to_bits());
    }
    FloatBits64::from_float(if a < b { a } else { b })
}

/// `f64.max`: propagates NaN; `max(-0, +0)` is `+0`.
pub fn f64_max(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    let (a, b) = (lhs.value(), rhs.value());
    if a.is_nan() || b.is_nan() {
        return FloatBits64::NAN;
    }
    if a == b {
        return FloatBits64::from_bits(lhs.to_bits() & rhs.to_bits());
    }
    FloatBits64::from_float(if a > b { a } else { b })
}

/// `f32.abs`: sign-bit clear, payload preserved.
#[must_use]
pub fn f32_abs(x: FloatBits32) -> FloatBits32 {
    FloatBits32::from_bits(x.to_bits() & 0x7fff_ffff)
}

/// `f32.neg`: sign-bit flip, payload preserved.
#[must_use]
pub fn f32_neg(x: FloatBits32) -> FloatBits32 {
    FloatBits32::from_bits(x.to_bits() ^ 0x8000_0000)
}

/// `f32.copysign`: payload of `lhs`, sign of `rhs`.
#[must_use]
pub fn f32_copysign(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    FloatBits32::from_bits((lhs.to_bits() & 0x7fff_ffff) | (rhs.to_bits() & 0x8000_0000))
}

/// `f64.abs`: sign-bit clear, payload preserved.
#[must_use]
pub fn f64_abs(x: FloatBits64) -> FloatBits64 {
    FloatBits64::from_bits(x.to_bits() & 0x7fff_ffff_ffff_ffff)
}

/// `f64.neg`: sign-bit flip, payload preserved.
#[must_use]
pub fn f64_neg(x: FloatBits64) -> FloatBits64 {
    FloatBits64::from_bits(x.to_bits() ^ 0x8000_0000_0000_0000)
}

/// `f64.copysign`: payload of `lhs`, sign of `rhs`.
#[must_use]
pub fn f64_copysign(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    FloatBits64::from_bits(
        (lhs.to_bits() & 0x7fff_ffff_ffff_ffff) | (rhs.to_bits() & 0x8000_0000_0000_0000),
    )
}

/// `f32.ceil`
pub fn f32_ceil(x: FloatBits32) -> FloatBits32 {
    canon_f32(rounding::ceil_f32(x.value()))
}

/// `f32.floor`
pub fn f32_floor(x: FloatBits32) -> FloatBits32 {
    canon_f32(rounding::floor_f32(x.value()))
}

/// `f32.trunc`
pub fn f32_trunc(x: FloatBits32) -> FloatBits32 {
    canon_f32(rounding::trunc_f32(x.value()))
}

/// `f32.sqrt`
pub fn f32_sqrt(x: FloatBits32) -> FloatBits32 {
    canon_f32(rounding::sqrt_f32(x.value()))
}

/// `f32.nearest`: round to nearest integer, ties to even.
pub fn f32_nearest(x: FloatBits32) -> FloatBits32 {
    let v = x.value();
    // round() breaks ties away from zero; pull odd tie results back.
    let mut r = rounding::round_f32(v);
    if (v - r).abs() == 0.5 && r % 2.0 != 0.0 {
        r -= v.signum();
    }
    if r == 0.0 {
        // The zero result keeps the operand's sign.
        r = 0.0f32.copysign(v);
    }
    canon_f32(r)
}

/// `f64.ceil`
pub fn f64_ceil(x: FloatBits64) -> FloatBits64 {
    canon_f64(rounding::ceil_f64(x.value()))
}

/// `f64.floor`
pub fn f64_floor(x: FloatBits64) -> FloatBits64 {
    canon_f64(rounding::floor_f64(x.value()))
}

/// `f64.trunc`
pub fn f64_trunc(x: FloatBits64) -> FloatBits64 {
    canon_f64(rounding::trunc_f64(x.value()))
}

/// `f64.sqrt`
pub fn f64_sqrt(x: FloatBits64) -> FloatBits64 {
    canon_f64(rounding::sqrt_f64(x.value()))
}

/// `f64.nearest`: round to nearest integer, ties to even.
pub fn f64_nearest(x: FloatBits64) -> FloatBits64 {
    let v = x.value();
    let mut r = rounding::round_f64(v);
    if (v - r).abs() == 0.5 && r % 2.0 != 0.0 {
        r -= v.signum();
    }
    if r == 0.0 {
        r = 0.0f64.copysign(v);
    }
    canon_f64(r)
}

// ---------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------

/// `i32.trunc_f32_s` / `i32.trunc_f64_s`: truncate toward zero, trapping
/// on NaN and on results outside the i32 range.
pub fn trunc_f32_to_i32_s(x: FloatBits32) -> Result<i32> {
    trunc_to_i32_s(f64::from(x.value()))
}

/// See [`trunc_f32_to_i32_s`].
pub fn trunc_f64_to_i32_s(x: FloatBits64) -> Result<i32> {
    trunc_to_i32_s(x.value())
}

/// `i32.trunc_f32_u` / `i32.trunc_f64_u`.
pub fn trunc_f32_to_i32_u(x: FloatBits32) -> Result<u32> {
    trunc_to_i32_u(f64::from(x.value()))
}

/// See [`trunc_f32_to_i32_u`].
pub fn trunc_f64_to_i32_u(x: FloatBits64) -> Result<u32> {
    trunc_to_i32_u(x.value())
}

fn trunc_to_i32_s(v: f64) -> Result<i32> {
    if v.is_nan() {
        return Err(BAD_CONVERSION);
    }
    let t = rounding::trunc_f64(v);
    if t >= 2_147_483_648.0 || t < -2_147_483_648.0 {
        return Err(OVERFLOW);
    }
    Ok(t as i32)
}

fn trunc_to_i32_u(v: f64) -> Result<u32> {
    if v.is_nan() {
        return Err(BAD_CONVERSION);
    }
    let t = rounding::trunc_f64(v);
    if t >= 4_294_967_296.0 || t < 0.0 {
        return Err(OVERFLOW);
    }
    Ok(t as u32)
}

/// `i64.trunc_f32_s`.
pub fn trunc_f32_to_i64_s(x: FloatBits32) -> Result<i64> {
    trunc_to_i64_s(f64::from(x.value()))
}

/// `i64.trunc_f64_s`.
pub fn trunc_f64_to_i64_s(x: FloatBits64) -> Result<i64> {
    trunc_to_i64_s(x.value())
}

/// `i64.trunc_f32_u`.
pub fn trunc_f32_to_i64_u(x: FloatBits32) -> Result<u64> {
    trunc_to_i64_u(f64::from(x.value()))
}

/// `i64.trunc_f64_u`.
pub fn trunc_f64_to_i64_u(x: FloatBits64) -> Result<u64> {
    trunc_to_i64_u(x.value())
}

fn trunc_to_i64_s(v: f64) -> Result<i64> {
    if v.is_nan() {
        return Err(BAD_CONVERSION);
    }
    let t = rounding::trunc_f64(v);
    // 2^63 is exactly representable; anything at or above it overflows.
    if t >= 9_223_372_036_854_775_808.0 || t < -9_223_372_036_854_775_808.0 {
        return Err(OVERFLOW);
    }
    Ok(t as i64)
}

fn trunc_to_i64_u(v: f64) -> Result<u64> {
    if v.is_nan() {
        return Err(BAD_CONVERSION);
    }
    let t = rounding::trunc_f64(v);
    if t >= 18_446_744_073_709_551_616.0 || t < 0.0 {
        return Err(OVERFLOW);
    }
    Ok(t as u64)
}

/// `f32.convert_i32_s` and friends: integer-to-float conversions round
/// to nearest even, which is what Rust's `as` casts do.
#[must_use]
pub fn convert_i32_s_to_f32(x: i32) -> FloatBits32 {
    FloatBits32::from_float(x as f32)
}

/// `f32.convert_i32_u`
#[must_use]
pub fn convert_i32_u_to_f32(x: u32) -> FloatBits32 {
    FloatBits32::from_float(x as f32)
}

/// `f32.convert_i64_s`
#[must_use]
pub fn convert_i64_s_to_f32(x: i64) -> FloatBits32 {
    FloatBits32::from_float(x as f32)
}

/// `f32.convert_i64_u`
#[must_use]
pub fn convert_i64_u_to_f32(x: u64) -> FloatBits32 {
    FloatBits32::from_float(x as f32)
}

/// `f64.convert_i32_s`
#[must_use]
pub fn convert_i32_s_to_f64(x: i32) -> FloatBits64 {
    FloatBits64::from_float(f64::from(x))
}

/// `f64.convert_i32_u`
#[must_use]
pub fn convert_i32_u_to_f64(x: u32) -> FloatBits64 {
    FloatBits64::from_float(f64::from(x))
}

/// `f64.convert_i64_s`
#[must_use]
pub fn convert_i64_s_to_f64(x: i64) -> FloatBits64 {
    FloatBits64::from_float(x as f64)
}

/// `f64.convert_i64_u`
#[must_use]
pub fn convert_i64_u_to_f64(x: u64) -> FloatBits64 {
    FloatBits64::from_float(x as f64)
}

/// `f32.demote_f64`
pub fn f32_demote_f64(x: FloatBits64) -> FloatBits32 {
    canon_f32(x.value() as f32)
}

/// `f64.promote_f32`
pub fn f64_promote_f32(x: FloatBits32) -> FloatBits64 {
    canon_f64(f64::from(x.value()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_s_traps() {
        assert_eq!(i32_div_s(7, 2), Ok(3));
        assert_eq!(i32_div_s(-7, 2), Ok(-3));
        assert_eq!(i32_div_s(1, 0), Err(DIVIDE_BY_ZERO));
        assert_eq!(i32_div_s(i32::MIN, -1), Err(OVERFLOW));
        assert_eq!(i64_div_s(i64::MIN, -1), Err(OVERFLOW));
    }

    #[test]
    fn test_rem_s_min_by_minus_one_is_zero() {
        assert_eq!(i32_rem_s(i32::MIN, -1), Ok(0));
        assert_eq!(i64_rem_s(i64::MIN, -1), Ok(0));
    }

    #[test]
    fn test_min_max_zero_signs() {
        let pz = FloatBits32::from_float(0.0);
        let nz = FloatBits32::from_float(-0.0);
        assert_eq!(f32_min(pz, nz).to_bits(), nz.to_bits());
        assert_eq!(f32_max(nz, pz).to_bits(), pz.to_bits());
    }

    #[test]
    fn test_min_max_nan_propagation() {
        let x = FloatBits64::from_float(1.0);
        let nan = FloatBits64::from_bits(0x7ff8_0000_0000_1234);
        assert_eq!(f64_min(x, nan), FloatBits64::NAN);
        assert_eq!(f64_max(nan, x), FloatBits64::NAN);
    }

    #[test]
    fn test_abs_neg_preserve_payload() {
        let nan = FloatBits32::from_bits(0xffc0_0001);
        assert_eq!(f32_abs(nan).to_bits(), 0x7fc0_0001);
        assert_eq!(f32_neg(nan).to_bits(), 0x7fc0_0001);
        assert_eq!(f32_neg(f32_neg(nan)).to_bits(), nan.to_bits());
    }

    #[test]
    fn test_nearest_ties_to_even() {
        for (input, expected) in [(2.5f64, 2.0), (3.5, 4.0), (-2.5, -2.0), (0.5, 0.0), (-0.5, -0.0)] {
            let got = f64_nearest(FloatBits64::from_float(input)).value();
            assert_eq!(got, expected, "nearest({input})");
            assert_eq!(got.is_sign_negative(), expected.is_sign_negative(), "sign of nearest({input})");
        }
    }

    #[test]
    fn test_trunc_range_checks() {
        assert_eq!(trunc_f64_to_i32_s(FloatBits64::from_float(-2147483648.9)), Ok(i32::MIN));
        assert_eq!(
            trunc_f64_to_i32_s(FloatBits64::from_float(2147483648.0)),
            Err(OVERFLOW)
        );
        assert_eq!(
            trunc_f32_to_i32_u(FloatBits32::from_float(-1.0)),
            Err(OVERFLOW)
        );
        assert_eq!(trunc_f32_to_i32_u(FloatBits32::from_float(-0.9)), Ok(0));
        assert_eq!(
            trunc_f64_to_i64_s(FloatBits64::from_bits(FloatBits64::NAN.to_bits())),
            Err(BAD_CONVERSION)
        );
    }

    #[test]
    fn test_arithmetic_nan_is_canonical() {
        let inf = FloatBits32::from_float(f32::INFINITY);
        let ninf = FloatBits32::from_float(f32::NEG_INFINITY);
        assert_eq!(f32_add(inf, ninf), FloatBits32::NAN);
        let zero = FloatBits64::from_float(0.0);
        assert_eq!(f64_div(zero, zero), FloatBits64::NAN);
    }
}
