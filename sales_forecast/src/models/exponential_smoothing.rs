//! Exponential smoothing model for daily sales

use crate::data::Series;
use crate::error::{ForecastError, Result};
use crate::models::{
    ensure_fittable, residual_std, FittedModel, ForecastFrame, ForecastModel, ForecastPoint,
    INTERVAL_Z,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Simple exponential smoothing model
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
}

/// Fitted exponential smoothing model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingHandle {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
    /// Level after the last observation
    level: f64,
    /// Spread of the one-step-ahead errors
    residual_std: f64,
    /// Last observed date
    last_observed: NaiveDate,
}

impl ExponentialSmoothing {
    /// Create a new exponential smoothing model
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Alpha must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Exponential Smoothing (alpha={})", alpha),
            alpha,
        })
    }
}

impl ForecastModel for ExponentialSmoothing {
    type Handle = SmoothingHandle;

    fn fit(&self, series: &Series) -> Result<Self::Handle> {
        let last_observed = ensure_fittable(series)?;
        let mut smoother = forecast_math::ExponentialSmoothing::new(self.alpha)?;

        // One-step-ahead errors: compare each value to the level before it
        let mut residuals = Vec::with_capacity(series.len());
        for &(_, value) in series.points() {
            if let Ok(level) = smoother.level() {
                residuals.push(value - level);
            }
            smoother.update(value);
        }

        Ok(SmoothingHandle {
            name: self.name.clone(),
            alpha: self.alpha,
            level: smoother.level()?,
            residual_std: residual_std(&residuals),
            last_observed,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl SmoothingHandle {
    /// Smoothed level the forecast is flat at
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl FittedModel for SmoothingHandle {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastFrame> {
        // In simple exponential smoothing, the forecast is constant at the last level
        let margin = INTERVAL_Z * self.residual_std;
        Ok(ForecastFrame::new(
            dates
                .iter()
                .map(|&date| ForecastPoint {
                    date,
                    value: self.level,
                    lower: Some(self.level - margin),
                    upper: Some(self.level + margin),
                })
                .collect(),
        ))
    }

    fn last_observed(&self) -> NaiveDate {
        self.last_observed
    }

    fn name(&self) -> &str {
        &self.name
    }
}
