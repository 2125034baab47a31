//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert an unsigned reward amount into the signed log representation,
/// saturating at `i64::MAX`.
#[must_use]
pub fn signed_amount(value: u64) -> i64 {
    cast::<u64, i64>(value).unwrap_or(i64::MAX)
}

/// Convert a count into `u32`, saturating at `u32::MAX`.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    cast::<usize, u32>(value).unwrap_or(u32::MAX)
}

/// Convert a small index into `f32` for layout math.
#[must_use]
pub fn usize_to_f32(value: usize) -> f32 {
    cast::<usize, f32>(value).unwrap_or(0.0)
}

/// Clamp a f32 into `[min, max]`, returning `min` for non-finite values.
#[must_use]
pub fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_amount_saturates() {
        assert_eq!(signed_amount(42), 42);
        assert_eq!(signed_amount(u64::MAX), i64::MAX);
    }

    #[test]
    fn usize_conversions_cover_ranges() {
        assert_eq!(usize_to_u32(7), 7);
        assert!((usize_to_f32(3) - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn clamp_handles_non_finite() {
        assert!((clamp_finite(f32::NAN, 1.0, 2.0) - 1.0).abs() < f32::EPSILON);
        assert!((clamp_finite(5.0, 1.0, 2.0) - 2.0).abs() < f32::EPSILON);
    }
}
