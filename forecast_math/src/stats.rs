//! Small statistics helpers shared by evaluation and ranking

/// Arithmetic mean, NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Minimum and maximum of the finite values, `None` if there are none
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Linear min-max scaling of `value` into [0, 1]
///
/// Returns `None` when the range is degenerate (`max <= min`).
pub fn min_max_scale(value: f64, min: f64, max: f64) -> Option<f64> {
    if max > min {
        Some((value - min) / (max - min))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_min_max_skips_nan() {
        assert_eq!(min_max(&[3.0, f64::NAN, -1.0, 2.0]), Some((-1.0, 3.0)));
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[f64::NAN]), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.54754, 4), 0.5475);
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(-2.345, 1), -2.3);
    }

    #[test]
    fn test_min_max_scale() {
        assert_eq!(min_max_scale(5.0, 0.0, 10.0), Some(0.5));
        assert_eq!(min_max_scale(5.0, 5.0, 5.0), None);
    }
}
