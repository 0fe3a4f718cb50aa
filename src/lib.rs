//! # SalesSight
//!
//! Facade over the workspace crates: `forecast_math` for the numeric
//! primitives and `sales_forecast` for training, storage, ranking and
//! inference.
//!
//! ## Example
//!
//! ```
//! use salessight_workspace::sales_forecast::ranking::{rank, RankingInput};
//!
//! let rows = rank(&[
//!     RankingInput::new("Chair", 500.0, 100.0, 115.5),
//!     RankingInput::new("Lamp", 150.0, 100.0, 105.0),
//! ]);
//! assert_eq!(rows[0].product, "Chair");
//! assert_eq!(rows[0].recommendation_score, 1.0);
//! ```

pub use forecast_math;
pub use sales_forecast;

pub use sales_forecast::{
    ArtifactStore, Availability, ForecastError, InferenceService, PipelineConfig, PipelineOutcome,
    RecommendationRow, TrainingPipeline,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_are_usable() {
        let config = PipelineConfig::default();
        assert_eq!(config.val_days, 30);
        assert_eq!(forecast_math::stats::round_to(0.54761, 4), 0.5476);
    }

    #[test]
    fn test_placeholder_rows() {
        let rows = sales_forecast::inference::placeholder_recommendations();
        assert_eq!(rows.len(), 3);
        assert!(rows
            .windows(2)
            .all(|w| w[0].recommendation_score >= w[1].recommendation_score));
    }
}
