//! Forecasting capability used by the training and inference paths
//!
//! The pipeline only ever sees two operations: fitting a model on a
//! [`Series`] and predicting a fitted handle at a set of dates. Fitted
//! handles are serde types so the artifact store can persist them.

use crate::data::{Series, MIN_TRAINING_POINTS};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod exponential_smoothing;
pub mod trend_seasonal;

pub use exponential_smoothing::{ExponentialSmoothing, SmoothingHandle};
pub use trend_seasonal::{TrendSeasonalHandle, TrendSeasonalModel};

/// z-score of the 95% prediction interval attached to point forecasts
pub(crate) const INTERVAL_Z: f64 = 1.96;

/// One predicted day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Point prediction
    pub value: f64,
    /// Lower prediction-interval bound, if the model provides one
    pub lower: Option<f64>,
    /// Upper prediction-interval bound, if the model provides one
    pub upper: Option<f64>,
}

/// Predictions for a sequence of dates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastFrame {
    points: Vec<ForecastPoint>,
}

impl ForecastFrame {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    /// Frame of point predictions without intervals
    pub fn from_values(dates: &[NaiveDate], values: &[f64]) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::Prediction(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        Ok(Self {
            points: dates
                .iter()
                .zip(values)
                .map(|(&date, &value)| ForecastPoint {
                    date,
                    value,
                    lower: None,
                    upper: None,
                })
                .collect(),
        })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Get the predicted values
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keep only the predictions dated strictly after `date`
    pub fn after(self, date: NaiveDate) -> Self {
        Self {
            points: self.points.into_iter().filter(|p| p.date > date).collect(),
        }
    }
}

/// A fitted, immutable model for one product
pub trait FittedModel: Debug {
    /// Predict the value at each of `dates`
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastFrame>;

    /// Last date of the series the model was fitted on
    fn last_observed(&self) -> NaiveDate;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted on a product series
pub trait ForecastModel: Debug + Clone {
    /// The fitted handle produced, persisted as the product's artifact
    type Handle: FittedModel + Serialize + DeserializeOwned;

    /// Fit the model; fails with [`ForecastError::ModelFit`] on fewer than 2 points
    fn fit(&self, series: &Series) -> Result<Self::Handle>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Reject series a model cannot be fitted on
pub(crate) fn ensure_fittable(series: &Series) -> Result<NaiveDate> {
    match series.last_date() {
        Some(last) if series.len() >= MIN_TRAINING_POINTS => Ok(last),
        _ => Err(ForecastError::ModelFit {
            product: None,
            reason: format!(
                "Need at least {MIN_TRAINING_POINTS} points, got {}",
                series.len()
            ),
        }),
    }
}

/// Population standard deviation of residuals, 0 when there are none
pub(crate) fn residual_std(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let mse = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
    if mse.is_finite() {
        mse.sqrt()
    } else {
        0.0
    }
}

/// Model selection, as written in configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Linear trend on the day index plus optional day-of-week offsets
    TrendSeasonal {
        #[serde(default = "default_weekly")]
        weekly_seasonality: bool,
    },
    /// Simple exponential smoothing, flat forecast at the last level
    ExponentialSmoothing { alpha: f64 },
}

fn default_weekly() -> bool {
    true
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec::TrendSeasonal {
            weekly_seasonality: true,
        }
    }
}

impl ModelSpec {
    /// Check the model parameters
    pub fn validate(&self) -> Result<()> {
        match self {
            ModelSpec::TrendSeasonal { .. } => Ok(()),
            ModelSpec::ExponentialSmoothing { alpha } => ExponentialSmoothing::new(*alpha).map(|_| ()),
        }
    }
}

/// Fitted handle of whichever model a [`ModelSpec`] selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedHandle {
    TrendSeasonal(TrendSeasonalHandle),
    ExponentialSmoothing(SmoothingHandle),
}

impl ForecastModel for ModelSpec {
    type Handle = FittedHandle;

    fn fit(&self, series: &Series) -> Result<Self::Handle> {
        match self {
            ModelSpec::TrendSeasonal { weekly_seasonality } => {
                TrendSeasonalModel::new(*weekly_seasonality)
                    .fit(series)
                    .map(FittedHandle::TrendSeasonal)
            }
            ModelSpec::ExponentialSmoothing { alpha } => ExponentialSmoothing::new(*alpha)?
                .fit(series)
                .map(FittedHandle::ExponentialSmoothing),
        }
    }

    fn name(&self) -> &str {
        match self {
            ModelSpec::TrendSeasonal { .. } => "trend_seasonal",
            ModelSpec::ExponentialSmoothing { .. } => "exponential_smoothing",
        }
    }
}

impl FittedModel for FittedHandle {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastFrame> {
        match self {
            FittedHandle::TrendSeasonal(h) => h.predict(dates),
            FittedHandle::ExponentialSmoothing(h) => h.predict(dates),
        }
    }

    fn last_observed(&self) -> NaiveDate {
        match self {
            FittedHandle::TrendSeasonal(h) => h.last_observed(),
            FittedHandle::ExponentialSmoothing(h) => h.last_observed(),
        }
    }

    fn name(&self) -> &str {
        match self {
            FittedHandle::TrendSeasonal(h) => h.name(),
            FittedHandle::ExponentialSmoothing(h) => h.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_fit_rejects_single_point() {
        let series = Series::from_points(vec![(day(1), 5.0)]);
        for spec in [
            ModelSpec::default(),
            ModelSpec::ExponentialSmoothing { alpha: 0.5 },
        ] {
            assert!(matches!(
                spec.fit(&series),
                Err(ForecastError::ModelFit { .. })
            ));
        }
    }

    #[test]
    fn test_handle_serde_keeps_variant() {
        let series = Series::from_points((1..=20).map(|d| (day(d), d as f64)));
        let handle = ModelSpec::ExponentialSmoothing { alpha: 0.5 }
            .fit(&series)
            .unwrap();

        let json = serde_json::to_string(&handle).unwrap();
        let back: FittedHandle = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, FittedHandle::ExponentialSmoothing(_)));
        assert_eq!(back.last_observed(), day(20));

        let dates = [day(21)];
        let before = handle.predict(&dates).unwrap().values()[0];
        let after = back.predict(&dates).unwrap().values()[0];
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_frame_after_truncates() {
        let dates = [day(1), day(2), day(3)];
        let frame = ForecastFrame::from_values(&dates, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(frame.after(day(1)).values(), vec![2.0, 3.0]);
        assert!(ForecastFrame::from_values(&dates, &[1.0]).is_err());
    }

    #[test]
    fn test_invalid_alpha_is_rejected() {
        assert!(ModelSpec::ExponentialSmoothing { alpha: 1.5 }.validate().is_err());
        assert!(ModelSpec::default().validate().is_ok());
    }
}
