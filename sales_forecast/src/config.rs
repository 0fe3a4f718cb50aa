//! Pipeline configuration
//!
//! Every field has a default, so a TOML file only needs to name what it
//! changes:
//!
//! ```toml
//! data_root = "data"
//! models_dir = "models"
//! val_days = 30
//! max_products = 50
//!
//! [model]
//! kind = "trend_seasonal"
//! weekly_seasonality = true
//! ```

use crate::aggregate::{DEFAULT_HORIZON, HORIZONS};
use crate::error::{ForecastError, Result};
use crate::models::ModelSpec;
use crate::split::DEFAULT_VALIDATION_DAYS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for training and inference runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root folder of the raw datasets
    pub data_root: PathBuf,
    /// Explicit Superstore file, overrides the layout under `data_root`
    pub superstore_path: Option<PathBuf>,
    /// Explicit store-sales file, overrides the layout under `data_root`
    pub store_sales_path: Option<PathBuf>,
    /// Where fitted models and `meta.json` are written
    pub models_dir: PathBuf,
    /// Where `recommendations.json` and `metrics.json` are written
    pub output_dir: PathBuf,
    /// Size of the trailing validation window, in points
    pub val_days: usize,
    /// Forecast horizons computed per product, in days
    pub horizons: Vec<usize>,
    /// Only train the first N products (by name)
    pub max_products: Option<usize>,
    /// Forecasting model to fit
    pub model: ModelSpec,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            superstore_path: None,
            store_sales_path: None,
            models_dir: PathBuf::from("models"),
            output_dir: PathBuf::from("output"),
            val_days: DEFAULT_VALIDATION_DAYS,
            horizons: HORIZONS.to_vec(),
            max_products: None,
            model: ModelSpec::default(),
        }
    }
}

impl PipelineConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check the values a run depends on
    pub fn validate(&self) -> Result<()> {
        if self.val_days == 0 {
            return Err(ForecastError::Config(
                "val_days must be positive".to_string(),
            ));
        }
        if self.horizons.is_empty() || self.horizons.contains(&0) {
            return Err(ForecastError::Config(
                "horizons must be a non-empty list of positive day counts".to_string(),
            ));
        }
        if !self.horizons.contains(&DEFAULT_HORIZON) {
            return Err(ForecastError::Config(format!(
                "horizons must include the {DEFAULT_HORIZON}-day ranking horizon"
            )));
        }
        if self.max_products == Some(0) {
            return Err(ForecastError::Config(
                "max_products must be positive when set".to_string(),
            ));
        }
        self.model.validate()
    }

    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_val_days(mut self, val_days: usize) -> Self {
        self.val_days = val_days;
        self
    }

    pub fn with_max_products(mut self, max: Option<usize>) -> Self {
        self.max_products = max;
        self
    }

    pub fn with_model(mut self, model: ModelSpec) -> Self {
        self.model = model;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.val_days, 30);
        assert_eq!(config.horizons, vec![30, 90]);
    }

    #[test]
    fn test_partial_document() {
        let config = PipelineConfig::from_toml_str(
            r#"
            models_dir = "/tmp/models"
            val_days = 14
            max_products = 5

            [model]
            kind = "exponential_smoothing"
            alpha = 0.4
            "#,
        )
        .unwrap();

        assert_eq!(config.models_dir, PathBuf::from("/tmp/models"));
        assert_eq!(config.val_days, 14);
        assert_eq!(config.max_products, Some(5));
        assert_eq!(config.model, ModelSpec::ExponentialSmoothing { alpha: 0.4 });
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(PipelineConfig::from_toml_str("val_days = 0").is_err());
        assert!(PipelineConfig::from_toml_str("horizons = [90]").is_err());
        assert!(PipelineConfig::from_toml_str("horizons = []").is_err());
        assert!(matches!(
            PipelineConfig::from_toml_str("val_days = \"x\""),
            Err(ForecastError::Config(_))
        ));
    }
}
