//! Trend plus day-of-week model for daily sales
//!
//! The model regresses sales on the number of days since the first
//! observation, then takes the mean residual per weekday as an additive
//! weekly profile:
//!
//! - Trend: `t(d) = slope * days(d) + intercept`
//! - Forecast: `y_hat(d) = t(d) + s[weekday(d)]`
//!
//! The weekly profile is only estimated once two full weeks are observed;
//! shorter series get a pure trend. Because the trend is defined for any
//! date, the handle can also reconstruct historical days.

use crate::data::Series;
use crate::error::Result;
use crate::models::{
    ensure_fittable, residual_std, FittedModel, ForecastFrame, ForecastModel, ForecastPoint,
    INTERVAL_Z,
};
use chrono::{Datelike, NaiveDate};
use forecast_math::LinearFit;
use serde::{Deserialize, Serialize};

/// Observations needed before a weekly profile is estimated
const MIN_SEASONAL_POINTS: usize = 14;

/// Linear trend with optional weekly seasonality
#[derive(Debug, Clone)]
pub struct TrendSeasonalModel {
    /// Name of the model
    name: String,
    /// Whether to estimate day-of-week offsets
    weekly_seasonality: bool,
}

/// Fitted trend/seasonal model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeasonalHandle {
    name: String,
    /// Day zero of the trend's x axis
    origin: NaiveDate,
    last_observed: NaiveDate,
    trend: LinearFit,
    /// Offsets indexed by days since Monday
    weekly: Option<[f64; 7]>,
    residual_std: f64,
}

impl TrendSeasonalModel {
    pub fn new(weekly_seasonality: bool) -> Self {
        let name = if weekly_seasonality {
            "Linear Trend + Weekly Seasonality"
        } else {
            "Linear Trend"
        };
        Self {
            name: name.to_string(),
            weekly_seasonality,
        }
    }
}

impl Default for TrendSeasonalModel {
    fn default() -> Self {
        Self::new(true)
    }
}

fn days_since(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

impl ForecastModel for TrendSeasonalModel {
    type Handle = TrendSeasonalHandle;

    fn fit(&self, series: &Series) -> Result<Self::Handle> {
        let last_observed = ensure_fittable(series)?;
        let points = series.points();
        let origin = points[0].0;

        let xs: Vec<f64> = points.iter().map(|(d, _)| days_since(origin, *d)).collect();
        let ys = series.values();
        let trend = LinearFit::fit(&xs, &ys)?;

        let detrended: Vec<f64> = xs
            .iter()
            .zip(&ys)
            .map(|(&x, &y)| y - trend.predict(x))
            .collect();

        let weekly = (self.weekly_seasonality && points.len() >= MIN_SEASONAL_POINTS).then(|| {
            let mut sums = [0.0; 7];
            let mut counts = [0usize; 7];
            for ((date, _), r) in points.iter().zip(&detrended) {
                sums[weekday_index(*date)] += r;
                counts[weekday_index(*date)] += 1;
            }
            let mut offsets = [0.0; 7];
            for i in 0..7 {
                if counts[i] > 0 {
                    offsets[i] = sums[i] / counts[i] as f64;
                }
            }
            // Center the profile so it does not shift the trend level
            let center = offsets.iter().sum::<f64>() / 7.0;
            offsets.map(|o| o - center)
        });

        let residuals: Vec<f64> = points
            .iter()
            .zip(&detrended)
            .map(|((date, _), r)| r - weekly.map_or(0.0, |w| w[weekday_index(*date)]))
            .collect();

        Ok(TrendSeasonalHandle {
            name: self.name.clone(),
            origin,
            last_observed,
            trend,
            weekly,
            residual_std: residual_std(&residuals),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrendSeasonalHandle {
    /// Daily trend increment
    pub fn slope(&self) -> f64 {
        self.trend.slope()
    }

    /// Day-of-week offsets, Monday first, if estimated
    pub fn weekly_profile(&self) -> Option<&[f64; 7]> {
        self.weekly.as_ref()
    }

    fn point_at(&self, date: NaiveDate) -> f64 {
        let base = self.trend.predict(days_since(self.origin, date));
        base + self.weekly.map_or(0.0, |w| w[weekday_index(date)])
    }
}

impl FittedModel for TrendSeasonalHandle {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastFrame> {
        let margin = INTERVAL_Z * self.residual_std;
        Ok(ForecastFrame::new(
            dates
                .iter()
                .map(|&date| {
                    let value = self.point_at(date);
                    ForecastPoint {
                        date,
                        value,
                        lower: Some(value - margin),
                        upper: Some(value + margin),
                    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Days;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_recovers_linear_trend() {
        let series =
            Series::from_points((0..20).map(|i| (monday() + Days::new(i), 100.0 + 2.0 * i as f64)));
        let handle = TrendSeasonalModel::new(false).fit(&series).unwrap();

        assert_relative_eq!(handle.slope(), 2.0, epsilon = 1e-9);
        let next = monday() + Days::new(20);
        let frame = handle.predict(&[next]).unwrap();
        assert_relative_eq!(frame.values()[0], 140.0, epsilon = 1e-9);
        assert_eq!(handle.last_observed(), monday() + Days::new(19));
    }

    #[test]
    fn test_weekly_profile_captures_weekend_peak() {
        // Flat 10 on weekdays, 24 on weekends, four weeks
        let series = Series::from_points((0..28).map(|i| {
            let date = monday() + Days::new(i);
            let value = if weekday_index(date) >= 5 { 24.0 } else { 10.0 };
            (date, value)
        }));
        let handle = TrendSeasonalModel::default().fit(&series).unwrap();

        let profile = handle.weekly_profile().unwrap();
        assert!(profile[5] > profile[0]);
        assert_relative_eq!(profile.iter().sum::<f64>(), 0.0, epsilon = 1e-9);

        let saturday = monday() + Days::new(33);
        let tuesday = monday() + Days::new(29);
        let frame = handle.predict(&[tuesday, saturday]).unwrap();
        // Weekend peak survives on top of the extrapolated trend
        assert_relative_eq!(frame.values()[1] - frame.values()[0], 14.0, epsilon = 1e-6);
    }

    #[test]
    fn test_short_series_has_no_profile() {
        let series = Series::from_points((0..5).map(|i| (monday() + Days::new(i), i as f64)));
        let handle = TrendSeasonalModel::default().fit(&series).unwrap();
        assert!(handle.weekly_profile().is_none());
    }

    #[test]
    fn test_two_points_fit() {
        let series = Series::from_points(vec![
            (monday(), 1.0),
            (monday() + Days::new(1), 3.0),
        ]);
        let handle = TrendSeasonalModel::default().fit(&series).unwrap();
        assert_relative_eq!(handle.slope(), 2.0, epsilon = 1e-9);
    }
}
