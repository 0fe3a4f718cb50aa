//! Answering ranking queries from persisted artifacts
//!
//! An [`InferenceService`] is built once from the loaded [`StoreState`] and
//! then only read. It never fits a model. When nothing could be loaded every
//! query answers with an empty result or [`Availability::Unavailable`], and
//! the caller decides on a fallback such as
//! [`placeholder_recommendations`].

use crate::aggregate::{forecast_horizon, DEFAULT_HORIZON};
use crate::models::FittedModel;
use crate::ranking::{rank, RankingInput, RecommendationRow};
use crate::store::{ArtifactStore, ProductMeta, StoreState};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A query answer that may be missing because no models are loaded
#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    Loaded(T),
    Unavailable,
}

impl<T> Availability<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Availability::Loaded(_))
    }

    /// The loaded value, or `fallback()` when unavailable
    pub fn unwrap_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Availability::Loaded(value) => value,
            Availability::Unavailable => fallback(),
        }
    }
}

/// Service health, as reported to a serving layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub models_loaded: bool,
}

/// Forecast total of one requested product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPrediction {
    pub product: String,
    /// Sum of the daily forecast, `None` when the product has no usable model
    pub predicted_sales: Option<f64>,
}

/// Read-only query interface over loaded artifacts
#[derive(Debug, Clone)]
pub struct InferenceService<H> {
    state: StoreState<H>,
}

impl<H> InferenceService<H> {
    pub fn from_state(state: StoreState<H>) -> Self {
        Self { state }
    }

    /// Load the artifacts of a store once
    pub fn load(store: &ArtifactStore) -> Self
    where
        H: DeserializeOwned,
    {
        Self::from_state(store.load())
    }

    /// True when at least one model was loaded
    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn health(&self) -> Health {
        Health {
            status: "ok".to_string(),
            models_loaded: self.is_loaded(),
        }
    }

    /// Names of all loaded products, sorted; empty when unavailable
    pub fn list_products(&self) -> Vec<String> {
        self.state
            .loaded()
            .map(|loaded| loaded.models.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Metadata of a loaded product
    pub fn meta(&self, product: &str) -> Option<&ProductMeta> {
        self.state.loaded()?.meta.get(product)
    }
}

impl<H: FittedModel> InferenceService<H> {
    /// Ranked recommendations, or `Unavailable` when no models are loaded
    pub fn recommendations(&self) -> Availability<Vec<RecommendationRow>> {
        let Some(loaded) = self.state.loaded() else {
            return Availability::Unavailable;
        };

        let mut inputs = Vec::with_capacity(loaded.models.len());
        for (product, handle) in &loaded.models {
            let Some(meta) = loaded.meta.get(product) else {
                debug!(product = %product, "No metadata, not ranked");
                continue;
            };
            let last_observed = meta.last_ds.unwrap_or_else(|| handle.last_observed());

            match forecast_horizon(handle, last_observed, DEFAULT_HORIZON) {
                Ok(forecast) if !forecast.is_empty() => {
                    inputs.push(RankingInput::from_forecast(
                        product.as_str(),
                        &forecast,
                        meta.past_avg,
                    ));
                }
                Ok(_) => debug!(product = %product, "Empty forecast, not ranked"),
                Err(e) => warn!(product = %product, "Predict failed: {e}"),
            }
        }

        Availability::Loaded(rank(&inputs))
    }

    /// Ranked recommendations; empty when no models are loaded
    pub fn list_recommendations(&self) -> Vec<RecommendationRow> {
        self.recommendations().unwrap_or_else(Vec::new)
    }

    /// Forecast totals over `horizon` days for the requested products
    ///
    /// Unknown products and failed predictions yield `predicted_sales: None`.
    pub fn predict(&self, products: &[String], horizon: usize) -> Availability<Vec<ProductPrediction>> {
        let Some(loaded) = self.state.loaded() else {
            return Availability::Unavailable;
        };

        Availability::Loaded(
            products
                .iter()
                .map(|product| {
                    let predicted_sales = loaded.models.get(product).and_then(|handle| {
                        let last_observed = loaded
                            .meta
                            .get(product)
                            .and_then(|m| m.last_ds)
                            .unwrap_or_else(|| handle.last_observed());
                        match forecast_horizon(handle, last_observed, horizon) {
                            Ok(forecast) if !forecast.is_empty() => Some(forecast.predicted_total),
                            Ok(_) => None,
                            Err(e) => {
                                warn!(product = %product, "Predict failed: {e}");
                                None
                            }
                        }
                    });
                    ProductPrediction {
                        product: product.clone(),
                        predicted_sales,
                    }
                })
                .collect(),
        )
    }
}

/// Fixed rows a serving layer can show while no models are loaded
///
/// The scores come from the real ranker, so they are consistent with the
/// predicted sales and growth rates shown.
pub fn placeholder_recommendations() -> Vec<RecommendationRow> {
    // Baseline 100, so the future average is 100 + growth
    let rows = [
        ("Mock Product A", 500.0, 15.5),
        ("Mock Product B", 300.0, 10.2),
        ("Mock Product C", 150.0, 5.0),
    ];
    let inputs: Vec<RankingInput> = rows
        .iter()
        .map(|&(product, total, growth)| RankingInput::new(product, total, 100.0, 100.0 + growth))
        .collect();
    rank(&inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unavailable_state_answers_empty() {
        let service: InferenceService<crate::models::FittedHandle> =
            InferenceService::from_state(StoreState::Unavailable);
        assert!(!service.is_loaded());
        assert!(service.list_products().is_empty());
        assert!(service.list_recommendations().is_empty());
        assert_eq!(service.recommendations(), Availability::Unavailable);
        assert!(!service.health().models_loaded);
    }

    #[test]
    fn test_placeholder_rows_are_ranked() {
        let rows = placeholder_recommendations();
        let products: Vec<&str> = rows.iter().map(|r| r.product.as_str()).collect();
        assert_eq!(products, ["Mock Product A", "Mock Product B", "Mock Product C"]);

        assert_eq!(rows[0].recommendation_score, 1.0);
        assert_relative_eq!(rows[1].recommendation_score, 0.5476, epsilon = 1e-9);
        assert_eq!(rows[2].recommendation_score, 0.15);
        assert_relative_eq!(rows[1].growth_rate, 10.2, epsilon = 1e-9);
    }
}
