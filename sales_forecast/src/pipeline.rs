//! Training and evaluation of one model per product
//!
//! For every product, sequentially:
//!
//! 1. skip it when the series is too short to evaluate
//! 2. hold out the trailing validation window
//! 3. fit on the training part and score predictions on the held-out dates;
//!    metrics stay NaN when there is no window or the training part is
//!    shorter than [`MIN_TRAINING_POINTS`]
//! 4. fit again on the full series and persist that model
//! 5. forecast the configured horizons from the full-series model
//!
//! A product that fails never stops the run; it gets a metrics record with
//! the error and is left out of the ranking. Artifacts of products that were
//! not persisted by the run are removed from the models directory.

use crate::aggregate::{forecast_horizon, forecast_horizons, HorizonForecast, DEFAULT_HORIZON};
use crate::config::PipelineConfig;
use crate::data::{SalesTable, Series, MIN_EVALUATION_POINTS, MIN_TRAINING_POINTS};
use crate::error::{ForecastError, Result};
use crate::metrics::{evaluate, EvaluationResult, MetricsRecord};
use crate::models::{FittedModel, ForecastModel, ModelSpec};
use crate::ranking::{rank, RankingInput, RecommendationRow};
use crate::split::split_train_validation;
use crate::store::{write_json_pretty, ArtifactStore, ProductMeta};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Ranked products written by a full run
pub const RECOMMENDATIONS_FILE: &str = "recommendations.json";

/// Per-product validation metrics written by a full run
pub const METRICS_FILE: &str = "metrics.json";

const NO_DATA_MESSAGE: &str = "No data after preprocessing.";
const NO_PRODUCTS_MESSAGE: &str = "No products found.";

/// A product whose production model was fitted and persisted
#[derive(Debug, Clone)]
pub struct TrainedProduct<H> {
    pub product: String,
    /// Model fitted on the full series
    pub handle: H,
    pub meta: ProductMeta,
    /// Validation error of the model fitted without the held-out window
    pub metrics: EvaluationResult,
    /// One forecast per configured horizon
    pub forecasts: Vec<HorizonForecast>,
}

impl<H> TrainedProduct<H> {
    /// Forecast for a given horizon, if it was computed
    pub fn forecast(&self, horizon: usize) -> Option<&HorizonForecast> {
        self.forecasts.iter().find(|f| f.horizon == horizon)
    }
}

/// What happened to one product
#[derive(Debug, Clone)]
pub enum ProductOutcome<H> {
    Trained(TrainedProduct<H>),
    /// Not enough data; nothing was persisted
    Skipped {
        product: String,
        reason: String,
        metrics: EvaluationResult,
    },
}

impl<H> ProductOutcome<H> {
    pub fn product(&self) -> &str {
        match self {
            ProductOutcome::Trained(t) => &t.product,
            ProductOutcome::Skipped { product, .. } => product,
        }
    }

    pub fn metrics(&self) -> EvaluationResult {
        match self {
            ProductOutcome::Trained(t) => t.metrics,
            ProductOutcome::Skipped { metrics, .. } => *metrics,
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, ProductOutcome::Trained(_))
    }
}

/// Summary of a completed full run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Ranked products, best first
    pub recommendations: Vec<RecommendationRow>,
    /// One record per attempted product
    pub metrics: BTreeMap<String, MetricsRecord>,
    pub products_trained: usize,
    /// Directory holding the written documents
    pub output_dir: PathBuf,
}

/// Result of a full run
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(PipelineReport),
    /// Nothing to train on; the message says why
    NoData(String),
}

/// Run steps 1 to 5 for a single product
///
/// Data shortage is reported as [`ProductOutcome::Skipped`]; fit, predict and
/// write failures are returned as errors for the caller to record.
pub fn train_and_evaluate_product<M: ForecastModel>(
    model: &M,
    product: &str,
    series: &Series,
    val_days: usize,
    horizons: &[usize],
    store: &ArtifactStore,
) -> Result<ProductOutcome<M::Handle>> {
    if series.len() < MIN_EVALUATION_POINTS {
        return Ok(skipped(
            product,
            format!(
                "{} points, need at least {MIN_EVALUATION_POINTS}",
                series.len()
            ),
        ));
    }

    let (train, validation) = split_train_validation(series, val_days);
    let metrics = if validation.is_empty() {
        EvaluationResult::nan()
    } else if train.len() < MIN_TRAINING_POINTS {
        info!(
            product,
            training_points = train.len(),
            "Too few training points to evaluate, persisting without metrics"
        );
        EvaluationResult::nan()
    } else {
        let validation_handle = model
            .fit(&train)
            .map_err(|e| attribute(e, product))?;
        let predicted = validation_handle.predict(&validation.dates())?;
        evaluate(&validation.values(), &predicted.values())
    };

    let (handle, meta) = fit_and_persist(model, product, series, store)?;
    let last_observed = meta.last_ds.unwrap_or_else(|| handle.last_observed());
    let forecasts = forecast_horizons(&handle, last_observed, horizons)?;

    debug!(product, %metrics, "Trained product");
    Ok(ProductOutcome::Trained(TrainedProduct {
        product: product.to_string(),
        handle,
        meta,
        metrics,
        forecasts,
    }))
}

fn skipped<H>(product: &str, reason: String) -> ProductOutcome<H> {
    info!(product, "Skipping product: {reason}");
    ProductOutcome::Skipped {
        product: product.to_string(),
        reason,
        metrics: EvaluationResult::nan(),
    }
}

fn attribute(err: ForecastError, product: &str) -> ForecastError {
    match err {
        ForecastError::ModelFit { product: None, reason } => {
            ForecastError::fit_failed(product, reason)
        }
        other => other,
    }
}

/// Fit on the full series, then write the artifact
fn fit_and_persist<M: ForecastModel>(
    model: &M,
    product: &str,
    series: &Series,
    store: &ArtifactStore,
) -> Result<(M::Handle, ProductMeta)> {
    let meta = ProductMeta::from_series(series).ok_or_else(|| {
        ForecastError::InsufficientData(format!("Empty series for {product:?}"))
    })?;
    let handle = model.fit(series).map_err(|e| attribute(e, product))?;
    store.save_model(product, &handle)?;
    Ok((handle, meta))
}

/// Trains every product of a sales table with one model
#[derive(Debug, Clone)]
pub struct TrainingPipeline<M> {
    model: M,
    config: PipelineConfig,
    store: ArtifactStore,
}

impl TrainingPipeline<ModelSpec> {
    /// Pipeline using the model selected in the configuration
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.model.clone(), config))
    }
}

impl<M: ForecastModel> TrainingPipeline<M> {
    pub fn new(model: M, config: PipelineConfig) -> Self {
        let store = ArtifactStore::new(&config.models_dir);
        Self {
            model,
            config,
            store,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    fn selected_products(&self, table: &SalesTable) -> Vec<String> {
        let mut products = table.products();
        if let Some(max) = self.config.max_products {
            products.truncate(max);
        }
        products
    }

    /// Train, evaluate, rank and write every output document
    pub fn run(&self, table: &SalesTable) -> Result<PipelineOutcome> {
        if table.is_empty() {
            warn!("{NO_DATA_MESSAGE}");
            return Ok(PipelineOutcome::NoData(NO_DATA_MESSAGE.to_string()));
        }
        let products = self.selected_products(table);
        if products.is_empty() {
            warn!("{NO_PRODUCTS_MESSAGE}");
            return Ok(PipelineOutcome::NoData(NO_PRODUCTS_MESSAGE.to_string()));
        }

        info!(
            products = products.len(),
            model = self.model.name(),
            "Starting training run"
        );

        let mut metrics = BTreeMap::new();
        let mut meta = BTreeMap::new();
        let mut inputs = Vec::new();

        for product in &products {
            let series = table.series_for(product);
            let outcome = train_and_evaluate_product(
                &self.model,
                product,
                &series,
                self.config.val_days,
                &self.config.horizons,
                &self.store,
            );

            match outcome {
                Ok(ProductOutcome::Trained(trained)) => {
                    let ranking = match trained.forecast(DEFAULT_HORIZON) {
                        Some(f) => Ok(f.clone()),
                        None => forecast_horizon(
                            &trained.handle,
                            trained.handle.last_observed(),
                            DEFAULT_HORIZON,
                        ),
                    };
                    match ranking {
                        Ok(forecast) if !forecast.is_empty() => inputs.push(
                            RankingInput::from_forecast(product, &forecast, trained.meta.past_avg),
                        ),
                        Ok(_) => warn!(product = %product, "Empty forecast, not ranked"),
                        Err(e) => warn!(product = %product, "Forecast failed, not ranked: {e}"),
                    }
                    metrics.insert(product.clone(), MetricsRecord::from(trained.metrics));
                    meta.insert(product.clone(), trained.meta);
                }
                Ok(other) => {
                    metrics.insert(product.clone(), MetricsRecord::from(other.metrics()));
                }
                Err(e) => {
                    warn!(product = %product, "Training failed: {e}");
                    metrics.insert(product.clone(), MetricsRecord::failed(&e));
                }
            }
        }

        self.store.save_meta(&meta)?;
        self.store.prune(meta.keys())?;
        let recommendations = rank(&inputs);

        let output_dir = self.config.output_dir.clone();
        write_json_pretty(&output_dir.join(RECOMMENDATIONS_FILE), &recommendations)?;
        write_json_pretty(&output_dir.join(METRICS_FILE), &metrics)?;

        info!(
            attempted = products.len(),
            trained = meta.len(),
            ranked = recommendations.len(),
            output_dir = %output_dir.display(),
            "Training run complete"
        );

        Ok(PipelineOutcome::Completed(PipelineReport {
            recommendations,
            metrics,
            products_trained: meta.len(),
            output_dir,
        }))
    }

    /// Fit and persist production models and metadata only
    ///
    /// No evaluation, ranking or output documents. Products with fewer than
    /// two points, or whose fit fails, are logged and skipped. Returns the
    /// metadata written.
    pub fn run_training_only(&self, table: &SalesTable) -> Result<BTreeMap<String, ProductMeta>> {
        if table.is_empty() {
            return Err(ForecastError::NoData(NO_DATA_MESSAGE.to_string()));
        }
        let products = self.selected_products(table);
        if products.is_empty() {
            return Err(ForecastError::NoData(NO_PRODUCTS_MESSAGE.to_string()));
        }

        let mut meta = BTreeMap::new();
        for product in &products {
            let series = table.series_for(product);
            if series.len() < MIN_TRAINING_POINTS {
                info!(product = %product, points = series.len(), "Skipping product: too few points");
                continue;
            }
            match fit_and_persist(&self.model, product, &series, &self.store) {
                Ok((_, product_meta)) => {
                    meta.insert(product.clone(), product_meta);
                }
                Err(e) => warn!(product = %product, "Training failed: {e}"),
            }
        }

        self.store.save_meta(&meta)?;
        self.store.prune(meta.keys())?;
        info!(
            trained = meta.len(),
            models_dir = %self.store.dir().display(),
            "Training complete"
        );
        Ok(meta)
    }
}
