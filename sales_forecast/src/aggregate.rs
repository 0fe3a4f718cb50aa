//! Horizon-level aggregation of forecasts
//!
//! Turns a fitted handle into the totals the ranking works on: the sum and
//! mean of the daily predictions over the days after the last observation.

use crate::error::Result;
use crate::models::{FittedModel, ForecastFrame};
use crate::utils::future_dates;
use chrono::NaiveDate;
use forecast_math::stats;

/// Horizons computed for every trained product, in days
pub const HORIZONS: [usize; 2] = [30, 90];

/// Horizon feeding the recommendation score
pub const DEFAULT_HORIZON: usize = 30;

/// Forecast of one product over one horizon
#[derive(Debug, Clone)]
pub struct HorizonForecast {
    /// Length of the horizon in days
    pub horizon: usize,
    /// Daily predictions, all dated after the last observation
    pub frame: ForecastFrame,
    /// Sum of the daily predictions
    pub predicted_total: f64,
    /// Mean of the daily predictions, NaN when the frame is empty
    pub future_average: f64,
}

impl HorizonForecast {
    /// Aggregate an already-truncated frame
    pub fn from_frame(horizon: usize, frame: ForecastFrame) -> Self {
        let values = frame.values();
        Self {
            horizon,
            predicted_total: values.iter().sum(),
            future_average: stats::mean(&values),
            frame,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }
}

/// Predict `horizon` days after `last_observed` and aggregate
///
/// Predictions dated on or before `last_observed` are discarded, so a model
/// that also reconstructs history never leaks it into the totals.
pub fn forecast_horizon<H: FittedModel + ?Sized>(
    handle: &H,
    last_observed: NaiveDate,
    horizon: usize,
) -> Result<HorizonForecast> {
    let dates = future_dates(last_observed, horizon);
    let frame = handle.predict(&dates)?.after(last_observed);
    Ok(HorizonForecast::from_frame(horizon, frame))
}

/// Forecast every horizon in `horizons`
pub fn forecast_horizons<H: FittedModel + ?Sized>(
    handle: &H,
    last_observed: NaiveDate,
    horizons: &[usize],
) -> Result<Vec<HorizonForecast>> {
    horizons
        .iter()
        .map(|&h| forecast_horizon(handle, last_observed, h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastPoint;
    use approx::assert_relative_eq;
    use chrono::Days;

    /// Predicts the day-of-month, and echoes back history the way a model
    /// with in-sample reconstruction would
    #[derive(Debug)]
    struct Echo {
        last: NaiveDate,
    }

    impl FittedModel for Echo {
        fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastFrame> {
            use chrono::Datelike;
            let mut points: Vec<ForecastPoint> = (0..3)
                .map(|i| self.last - Days::new(i))
                .map(|date| ForecastPoint {
                    date,
                    value: 1000.0,
                    lower: None,
                    upper: None,
                })
                .collect();
            points.extend(dates.iter().map(|&date| ForecastPoint {
                date,
                value: date.day() as f64,
                lower: None,
                upper: None,
            }));
            Ok(ForecastFrame::new(points))
        }

        fn last_observed(&self) -> NaiveDate {
            self.last
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_history_is_excluded() {
        let last = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let forecast = forecast_horizon(&Echo { last }, last, 3).unwrap();

        assert_eq!(forecast.frame.len(), 3);
        assert!(forecast.frame.dates().iter().all(|d| *d > last));
        // Feb 1, 2, 3
        assert_relative_eq!(forecast.predicted_total, 6.0);
        assert_relative_eq!(forecast.future_average, 2.0);
    }

    #[test]
    fn test_all_horizons() {
        let last = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let forecasts = forecast_horizons(&Echo { last }, last, &HORIZONS).unwrap();
        assert_eq!(forecasts.len(), 2);
        assert_eq!(forecasts[0].frame.len(), 30);
        assert_eq!(forecasts[1].frame.len(), 90);
    }

    #[test]
    fn test_empty_frame_has_nan_average() {
        let forecast = HorizonForecast::from_frame(30, ForecastFrame::default());
        assert!(forecast.is_empty());
        assert_eq!(forecast.predicted_total, 0.0);
        assert!(forecast.future_average.is_nan());
    }
}
