//! Opportunity ranking of products
//!
//! Each product gets two signals, predicted volume and growth against its
//! historical baseline. Both are normalized across the ranked set and
//! blended with equal weight:
//!
//! - `sales_norm = total / max_total` (divisor 1 when no total is positive)
//! - `growth_norm = (growth - min) / (max - min)`, or 0.5 for everyone when
//!   all growth rates are equal
//! - `score = clamp(0.5 * sales_norm + 0.5 * growth_norm, 0, 1)`
//!
//! Rows are sorted by score, highest first, with ties broken by product name
//! so the output is reproducible.

use crate::aggregate::HorizonForecast;
use forecast_math::stats::{min_max, min_max_scale, round_to};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

const SALES_WEIGHT: f64 = 0.5;
const GROWTH_WEIGHT: f64 = 0.5;
const NEUTRAL_GROWTH_NORM: f64 = 0.5;

/// What the ranker needs to know about one product
#[derive(Debug, Clone, PartialEq)]
pub struct RankingInput {
    pub product: String,
    /// Sum of the forecast over the ranking horizon
    pub predicted_total: f64,
    /// Mean of the historical values
    pub baseline_average: f64,
    /// Mean of the forecast over the ranking horizon
    pub future_average: f64,
}

/// One ranked product, as written to `recommendations.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRow {
    pub product: String,
    /// Predicted total over the horizon, 2 decimals
    pub predicted_sales: f64,
    /// Growth against the baseline in percent, 2 decimals
    pub growth_rate: f64,
    /// Blended score in [0, 1], 4 decimals
    pub recommendation_score: f64,
}

/// Unrounded intermediate values of the score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub product: String,
    pub predicted_total: f64,
    pub growth_rate: f64,
    pub sales_norm: f64,
    pub growth_norm: f64,
    /// Clamped to [0, 1], not rounded
    pub score: f64,
}

impl RankingInput {
    pub fn new(
        product: impl Into<String>,
        predicted_total: f64,
        baseline_average: f64,
        future_average: f64,
    ) -> Self {
        Self {
            product: product.into(),
            predicted_total,
            baseline_average,
            future_average,
        }
    }

    /// Input built from a horizon forecast and the product's baseline
    pub fn from_forecast(
        product: impl Into<String>,
        forecast: &HorizonForecast,
        baseline_average: f64,
    ) -> Self {
        Self::new(
            product,
            forecast.predicted_total,
            baseline_average,
            forecast.future_average,
        )
    }

    /// Growth of the forecast against the baseline, in percent
    pub fn growth_rate(&self) -> f64 {
        growth_rate_percent(self.baseline_average, self.future_average)
    }

    fn is_rankable(&self) -> bool {
        self.predicted_total.is_finite() && self.future_average.is_finite()
    }
}

/// `(future - baseline) / baseline * 100`, or 0 unless the baseline is positive
pub fn growth_rate_percent(baseline_average: f64, future_average: f64) -> f64 {
    if baseline_average > 0.0 {
        (future_average - baseline_average) / baseline_average * 100.0
    } else {
        0.0
    }
}

/// Compute the normalized signals and blended score of every product
///
/// Products whose forecast is empty (non-finite total or average) are left
/// out.
pub fn score_components(inputs: &[RankingInput]) -> Vec<ScoreBreakdown> {
    let rankable: Vec<&RankingInput> = inputs
        .iter()
        .filter(|input| {
            let ok = input.is_rankable();
            if !ok {
                debug!(product = %input.product, "Excluded from ranking: no forecast values");
            }
            ok
        })
        .collect();

    let totals: Vec<f64> = rankable.iter().map(|i| i.predicted_total).collect();
    let growths: Vec<f64> = rankable.iter().map(|i| i.growth_rate()).collect();

    let sales_divisor = match min_max(&totals) {
        Some((_, max)) if max > 0.0 => max,
        _ => 1.0,
    };
    let growth_range = min_max(&growths);

    rankable
        .iter()
        .zip(growths)
        .map(|(input, growth_rate)| {
            let sales_norm = input.predicted_total / sales_divisor;
            let growth_norm = growth_range
                .and_then(|(min, max)| min_max_scale(growth_rate, min, max))
                .unwrap_or(NEUTRAL_GROWTH_NORM);
            let score =
                (SALES_WEIGHT * sales_norm + GROWTH_WEIGHT * growth_norm).clamp(0.0, 1.0);

            ScoreBreakdown {
                product: input.product.clone(),
                predicted_total: input.predicted_total,
                growth_rate,
                sales_norm,
                growth_norm,
                score,
            }
        })
        .collect()
}

/// Score and order products, best opportunity first
pub fn rank(inputs: &[RankingInput]) -> Vec<RecommendationRow> {
    let mut rows: Vec<RecommendationRow> = score_components(inputs)
        .into_iter()
        .map(|b| RecommendationRow {
            product: b.product,
            predicted_sales: round_to(b.predicted_total, 2),
            growth_rate: round_to(b.growth_rate, 2),
            recommendation_score: round_to(b.score, 4).clamp(0.0, 1.0),
        })
        .collect();

    rows.sort_by(compare_rows);
    rows
}

/// Descending score, then ascending product name
fn compare_rows(a: &RecommendationRow, b: &RecommendationRow) -> Ordering {
    b.recommendation_score
        .total_cmp(&a.recommendation_score)
        .then_with(|| a.product.cmp(&b.product))
}
