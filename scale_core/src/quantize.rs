//! Integer-gram arithmetic helpers.
//!
//! The controller works in whole grams (`i32`). Sensor samples arrive as
//! `f32` and are rounded once at the boundary; everything downstream
//! (debounce comparison, zones, speech, display) stays integral.

/// Round a grams value to the nearest whole gram, clamping to the `i32`
/// range. Non-finite values (NaN/±Inf) map to 0.
#[inline]
pub fn quantize_grams(x_g: f32) -> i32 {
    if !x_g.is_finite() {
        return 0;
    }
    let rounded = x_g.round();
    if rounded >= i32::MAX as f32 {
        i32::MAX
    } else if rounded <= i32::MIN as f32 {
        i32::MIN
    } else {
        rounded as i32
    }
}

/// Largest magnitude representable with `digits` decimal digits.
#[inline]
pub fn max_for_digits(digits: u8) -> i32 {
    10_i32
        .checked_pow(u32::from(digits.min(9)))
        .map_or(i32::MAX, |p| p - 1)
}

/// Clamp a value to what a `digits`-wide display can show; one position is
/// spent on the minus sign for negative values.
#[inline]
pub fn clamp_to_display(value: i32, digits: u8) -> i32 {
    let hi = max_for_digits(digits);
    let lo = -max_for_digits(digits.saturating_sub(1));
    value.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_gram() {
        assert_eq!(quantize_grams(12.4), 12);
        assert_eq!(quantize_grams(12.5), 13);
        assert_eq!(quantize_grams(-0.6), -1);
        assert_eq!(quantize_grams(f32::NAN), 0);
        assert_eq!(quantize_grams(f32::INFINITY), 0);
        assert_eq!(quantize_grams(1e12), i32::MAX);
    }

    #[test]
    fn display_range_for_four_digits() {
        assert_eq!(max_for_digits(3), 999);
        assert_eq!(clamp_to_display(12_345, 4), 9999);
        assert_eq!(clamp_to_display(-5_000, 4), -999);
        assert_eq!(clamp_to_display(-42, 4), -42);
        assert_eq!(clamp_to_display(-5, 1), 0);
    }
}
