//! Least-squares trend fitting
//!
//! Fits `y = slope * x + intercept` over arbitrary (not necessarily
//! contiguous) x positions, which lets callers regress sales on a day index
//! that has gaps.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Fitted linear trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    slope: f64,
    intercept: f64,
    r_squared: Option<f64>,
}

impl LinearFit {
    /// Fit a line through the given points
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(MathError::InvalidInput(format!(
                "x length ({}) doesn't match y length ({})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(MathError::InsufficientData(
                "Need at least 2 points for linear regression".to_string(),
            ));
        }

        let n = xs.len() as f64;
        let x_mean = xs.iter().sum::<f64>() / n;
        let y_mean = ys.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (&x, &y) in xs.iter().zip(ys) {
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        if denominator.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;
        for (&x, &y) in xs.iter().zip(ys) {
            ss_total += (y - y_mean).powi(2);
            ss_residual += (y - (slope * x + intercept)).powi(2);
        }
        // A flat series has no variance to explain
        let r_squared = (ss_total.abs() >= 1e-10).then(|| 1.0 - ss_residual / ss_total);

        Ok(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Evaluate the line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Trend direction and strength per unit of x
    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient of determination, `None` for a constant series
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_line() {
        let fit = LinearFit::fit(&[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0]).unwrap();

        assert!((fit.slope() - 10.0).abs() < 0.001);
        assert!((fit.intercept() - 10.0).abs() < 0.001);
        assert!((fit.predict(3.0) - 40.0).abs() < 0.001);
        assert!(fit.r_squared().unwrap() > 0.999);
    }

    #[test]
    fn test_gapped_positions() {
        // Same line sampled with a hole at x = 2
        let fit = LinearFit::fit(&[0.0, 1.0, 3.0, 4.0], &[1.0, 3.0, 7.0, 9.0]).unwrap();
        assert!((fit.slope() - 2.0).abs() < 1e-9);
        assert!((fit.predict(2.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_series_has_no_r_squared() {
        let fit = LinearFit::fit(&[0.0, 1.0, 2.0], &[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(fit.slope(), 0.0);
        assert!(fit.r_squared().is_none());
    }

    #[test]
    fn test_rejects_short_or_mismatched_input() {
        assert!(matches!(
            LinearFit::fit(&[1.0], &[1.0]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            LinearFit::fit(&[1.0, 2.0], &[1.0]),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            LinearFit::fit(&[1.0, 1.0], &[1.0, 2.0]),
            Err(MathError::CalculationError(_))
        ));
    }
}
