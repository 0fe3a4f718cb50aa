//! Metrics for evaluating forecast performance
//!
//! A NaN metric means "not enough data to evaluate" and is kept distinct from
//! a zero error. In JSON documents NaN is written as `null` and read back as
//! NaN.

use serde::{Deserialize, Serialize};

/// Validation error of one product's forecast
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Mean Absolute Error
    #[serde(with = "nan_as_null")]
    pub mae: f64,
    /// Root Mean Squared Error
    #[serde(with = "nan_as_null")]
    pub rmse: f64,
}

/// Metrics entry for one attempted product in `metrics.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRecord {
    #[serde(with = "nan_as_null")]
    pub mae: f64,
    #[serde(with = "nan_as_null")]
    pub rmse: f64,
    /// Failure description when the product could not be trained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationResult {
    /// Result for a product that could not be evaluated
    pub fn nan() -> Self {
        Self {
            mae: f64::NAN,
            rmse: f64::NAN,
        }
    }

    /// True when the metrics carry no information
    pub fn is_nan(&self) -> bool {
        self.mae.is_nan() && self.rmse.is_nan()
    }
}

impl PartialEq for EvaluationResult {
    /// NaN compares equal to NaN here, so "not evaluated" results match
    fn eq(&self, other: &Self) -> bool {
        fn same(a: f64, b: f64) -> bool {
            (a.is_nan() && b.is_nan()) || a == b
        }
        same(self.mae, other.mae) && same(self.rmse, other.rmse)
    }
}

impl std::fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MAE: {:.4}, RMSE: {:.4}", self.mae, self.rmse)
    }
}

impl From<EvaluationResult> for MetricsRecord {
    fn from(result: EvaluationResult) -> Self {
        Self {
            mae: result.mae,
            rmse: result.rmse,
            error: None,
        }
    }
}

impl MetricsRecord {
    /// Record for a product whose training failed
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            mae: f64::NAN,
            rmse: f64::NAN,
            error: Some(error.to_string()),
        }
    }

    pub fn evaluation(&self) -> EvaluationResult {
        EvaluationResult {
            mae: self.mae,
            rmse: self.rmse,
        }
    }
}

/// Compare actual values against predictions
///
/// Sequences of different length are truncated to the shorter one, and pairs
/// where either side is NaN are dropped. With no valid pair left both
/// metrics are NaN.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> EvaluationResult {
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| !a.is_nan() && !p.is_nan())
        .map(|(a, p)| a - p)
        .collect();

    if errors.is_empty() {
        return EvaluationResult::nan();
    }

    let n = errors.len() as f64;
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    EvaluationResult {
        mae,
        rmse: mse.sqrt(),
    }
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_is_nan() {
        let result = evaluate(&[], &[]);
        assert!(result.mae.is_nan());
        assert!(result.rmse.is_nan());
        assert!(result.is_nan());
    }

    #[test]
    fn test_perfect_fit_is_zero() {
        let result = evaluate(&[10.0, 20.0], &[10.0, 20.0]);
        assert_eq!(result.mae, 0.0);
        assert_eq!(result.rmse, 0.0);
        assert!(!result.is_nan());
    }

    #[test]
    fn test_regression_metrics() {
        let actual = [10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = [12.0, 18.0, 33.0, 37.0, 52.0];

        let result = evaluate(&actual, &predicted);
        assert_relative_eq!(result.mae, 2.4, epsilon = 1e-9);
        assert_relative_eq!(result.rmse, 6.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_truncates_and_drops_nan_pairs() {
        let result = evaluate(&[1.0, f64::NAN, 3.0, 100.0], &[2.0, 5.0, 3.0]);
        // pairs (1,2) and (3,3) remain
        assert_relative_eq!(result.mae, 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.rmse, 0.5_f64.sqrt(), epsilon = 1e-12);

        assert!(evaluate(&[f64::NAN], &[1.0]).is_nan());
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let record = MetricsRecord::from(EvaluationResult::nan());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"mae":null,"rmse":null}"#);

        let back: MetricsRecord = serde_json::from_str(&json).unwrap();
        assert!(back.evaluation().is_nan());
    }

    #[test]
    fn test_failed_record_keeps_error() {
        let record = MetricsRecord::failed("boom");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["error"], "boom");
        assert!(json["mae"].is_null());
    }
}
