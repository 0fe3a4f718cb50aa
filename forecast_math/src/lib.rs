//! # Forecast Math
//!
//! Numeric building blocks for the sales forecasting crates.
//! This crate provides least-squares trend fitting, exponential smoothing
//! and the small statistics helpers (means, ranges, decimal rounding)
//! shared by the training and ranking code.

use thiserror::Error;

pub mod regression;
pub mod smoothing;
pub mod stats;

pub use regression::LinearFit;
pub use smoothing::ExponentialSmoothing;

/// Errors that can occur in forecasting math
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;
