//! # Sales Forecast
//!
//! A Rust library for per-product sales forecasting and opportunity ranking.
//!
//! ## Features
//!
//! - Loading and standardizing daily sales exports (Superstore, store-sales)
//! - Per-product daily series with a trailing validation window
//! - Forecasting models (Linear Trend + Weekly Seasonality, Exponential Smoothing)
//! - Validation metrics (MAE, RMSE) with explicit "not evaluated" results
//! - Persisted model artifacts that load tolerantly
//! - Ranking of products by predicted volume and growth
//!
//! ## Training and Inference
//!
//! Training fits one model per product and writes artifacts; inference only
//! loads them and answers queries:
//!
//! ```rust,no_run
//! use sales_forecast::config::PipelineConfig;
//! use sales_forecast::ingest::get_preprocessed;
//! use sales_forecast::inference::{placeholder_recommendations, InferenceService};
//! use sales_forecast::models::FittedHandle;
//! use sales_forecast::pipeline::TrainingPipeline;
//! use sales_forecast::store::ArtifactStore;
//!
//! # fn main() -> sales_forecast::Result<()> {
//! let config = PipelineConfig::default().with_models_dir("models");
//!
//! // Offline: train, evaluate, rank and persist
//! let table = get_preprocessed(&config)?;
//! let outcome = TrainingPipeline::from_config(config.clone())?.run(&table)?;
//!
//! // Serving: load once, then query
//! let service: InferenceService<FittedHandle> =
//!     InferenceService::load(&ArtifactStore::new(&config.models_dir));
//! let rows = service
//!     .recommendations()
//!     .unwrap_or_else(placeholder_recommendations);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod inference;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod ranking;
pub mod split;
pub mod store;
pub mod synthetic;
pub mod utils;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{SalesRecord, SalesTable, Series};
pub use crate::error::{ForecastError, Result};
pub use crate::inference::{Availability, InferenceService};
pub use crate::metrics::{evaluate, EvaluationResult, MetricsRecord};
pub use crate::models::{FittedHandle, FittedModel, ForecastFrame, ForecastModel, ModelSpec};
pub use crate::pipeline::{PipelineOutcome, PipelineReport, TrainingPipeline};
pub use crate::ranking::{rank, RankingInput, RecommendationRow};
pub use crate::store::{ArtifactStore, ProductMeta, StoreState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
