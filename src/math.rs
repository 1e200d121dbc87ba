//! Numeric helpers shared by the statistics and window code

/// Round to the nearest integer, ties away from zero
///
/// This is the rounding used to turn a window offset into a window index.
/// Exact half-step offsets round outward (`2.5 -> 3`, `-2.5 -> -3`).
#[inline]
pub fn round_half_away(x: f64) -> i64 {
    x.round() as i64
}

/// Linearly interpolated percentile of an ascending slice
///
/// `fraction` is the rank in `[0, 1]`. The rank is mapped onto
/// `fraction * (len - 1)` and the two neighbouring order statistics are
/// blended, so the median of `[1, 2]` is `1.5`.
pub fn interpolated_percentile(sorted: &[f64], fraction: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let rank = fraction * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        Some(sorted[lower])
    } else {
        let weight = rank - lower as f64;
        Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
    }
}

/// Sort a copy of `values` ascending
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Divide a window sum by its denominator sum
///
/// A zero denominator does not produce a plain IEEE quotient: `0 / 0` is NaN
/// and `x / 0` is an infinity carrying the sign of `x`. Callers rely on this
/// exact policy even though it disagrees with zero-for-empty-window output.
#[inline]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        if numerator == 0.0 {
            f64::NAN
        } else if numerator > 0.0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_half_away(2.5), 3);
        assert_eq!(round_half_away(-2.5), -3);
        assert_eq!(round_half_away(2.4999), 2);
        assert_eq!(round_half_away(-0.4), 0);
    }

    #[test]
    fn test_interpolated_percentile() {
        assert_eq!(interpolated_percentile(&[], 0.5), None);
        assert_eq!(interpolated_percentile(&[7.0], 0.99), Some(7.0));
        assert_eq!(interpolated_percentile(&[1.0, 2.0], 0.5), Some(1.5));
        assert_eq!(interpolated_percentile(&[0.0, 1.0, 5.0], 0.5), Some(1.0));
        assert_eq!(interpolated_percentile(&[10.0, 20.0, 30.0], 1.0), Some(30.0));
        assert_eq!(interpolated_percentile(&[10.0, 20.0, 30.0], 0.0), Some(10.0));
    }

    #[test]
    fn test_ratio_div_by_zero() {
        assert!(ratio(0.0, 0.0).is_nan());
        assert_eq!(ratio(1.0, 0.0), f64::INFINITY);
        assert_eq!(ratio(-1.0, 0.0), f64::NEG_INFINITY);
        assert_eq!(ratio(1.0, 4.0), 0.25);
    }
}
