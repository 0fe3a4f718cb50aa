//! Error types for the sales_forecast crate

use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Series too short to train or evaluate
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The forecasting capability failed while fitting
    #[error("Model fit error{}: {reason}", product_suffix(.product))]
    ModelFit {
        product: Option<String>,
        reason: String,
    },

    /// The forecasting capability failed while predicting
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// A persisted artifact could not be read back
    #[error("Corrupt artifact {path:?}: {reason}")]
    ArtifactCorruption { path: PathBuf, reason: String },

    /// No usable input at all
    #[error("No data: {0}")]
    NoData(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error loading or validating configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from the numeric helpers
    #[error("Math error: {0}")]
    Math(#[from] forecast_math::MathError),
}

impl ForecastError {
    /// Fit failure attributed to a product
    pub fn fit_failed(product: impl Into<String>, reason: impl Into<String>) -> Self {
        ForecastError::ModelFit {
            product: Some(product.into()),
            reason: reason.into(),
        }
    }
}

fn product_suffix(product: &Option<String>) -> String {
    product
        .as_ref()
        .map(|p| format!(" for {p:?}"))
        .unwrap_or_default()
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}
