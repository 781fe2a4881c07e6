//! Numeric utilities: centralized integer/float conversions for decoded filter values.
//!
//! Guidelines
//! - Prefer fallible conversions (returning Option<T>) when an out-of-range value must be rejected (e.g., a `$size` operand).
//! - Lossy float conversions are only used where the wire value was already outside the integer range.

/// Narrow to i32 when the value fits; BSON query documents prefer the smaller width.
#[inline]
#[must_use]
pub fn i64_to_i32(v: i64) -> Option<i32> {
    i32::try_from(v).ok()
}

/// Unsigned JSON numbers above `i64::MAX` keep their magnitude as a float.
#[inline]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn u64_to_f64_lossy(v: u64) -> f64 {
    v as f64
}

/// Integral floats that fit an i64 exactly, e.g. `3.0`; anything else is None.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn f64_to_i64_exact(v: f64) -> Option<i64> {
    if !v.is_finite() || v.fract() != 0.0 {
        return None;
    }
    if v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}
