use chrono::{Days, NaiveDate};
use sales_forecast::inference::{placeholder_recommendations, Availability, InferenceService};
use sales_forecast::models::{FittedHandle, ForecastModel, ModelSpec};
use sales_forecast::store::{ArtifactStore, ProductMeta};
use sales_forecast::Series;
use std::collections::BTreeMap;
use tempfile::tempdir;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Save a flat-trend product and its metadata
fn save_product(store: &ArtifactStore, meta: &mut BTreeMap<String, ProductMeta>, name: &str, level: f64) {
    let series = Series::from_points((0..60).map(|i| (start() + Days::new(i), level)));
    let model = ModelSpec::TrendSeasonal {
        weekly_seasonality: false,
    };
    store.save_model(name, &model.fit(&series).unwrap()).unwrap();
    meta.insert(name.to_string(), ProductMeta::from_series(&series).unwrap());
}

#[test]
fn test_recommendations_from_saved_models() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let mut meta = BTreeMap::new();
    save_product(&store, &mut meta, "Lamp", 10.0);
    save_product(&store, &mut meta, "Desk", 40.0);
    store.save_meta(&meta).unwrap();

    let service: InferenceService<FittedHandle> = InferenceService::load(&store);
    assert!(service.is_loaded());
    assert_eq!(service.list_products(), vec!["Desk", "Lamp"]);

    let Availability::Loaded(rows) = service.recommendations() else {
        panic!("expected loaded recommendations");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].product, "Desk");
    // Flat series: 30 days at the level, no growth
    assert!((rows[0].predicted_sales - 1200.0).abs() < 1e-6);
    assert!(rows[0].growth_rate.abs() < 1e-6);
    assert_eq!(rows[0].recommendation_score, 0.75);
    assert_eq!(service.list_recommendations(), rows);
}

#[test]
fn test_predict_known_and_unknown_products() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let mut meta = BTreeMap::new();
    save_product(&store, &mut meta, "Lamp", 10.0);
    store.save_meta(&meta).unwrap();

    let service: InferenceService<FittedHandle> = InferenceService::load(&store);
    let Availability::Loaded(predictions) =
        service.predict(&["Lamp".to_string(), "Sofa".to_string()], 7)
    else {
        panic!("expected loaded predictions");
    };
    assert!((predictions[0].predicted_sales.unwrap() - 70.0).abs() < 1e-6);
    assert_eq!(predictions[1].predicted_sales, None);
}

#[test]
fn test_empty_store_falls_back_to_placeholders() {
    let dir = tempdir().unwrap();
    let service: InferenceService<FittedHandle> =
        InferenceService::load(&ArtifactStore::new(dir.path()));

    assert!(!service.health().models_loaded);
    assert!(service.list_products().is_empty());
    let rows = service
        .recommendations()
        .unwrap_or_else(placeholder_recommendations);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].product, "Mock Product A");
}
