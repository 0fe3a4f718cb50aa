//! Deterministic synthetic sales data
//!
//! Produces store-sales style daily series (one row per product and day)
//! with a level, a linear trend, a weekend uplift and Gaussian noise. The
//! same seed always yields the same table.

use crate::data::{SalesRecord, SalesTable};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, Days, NaiveDate};
use forecast_math::stats::round_to;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Product families used for generated names
pub const FAMILIES: [&str; 10] = [
    "AUTOMOTIVE",
    "BEAUTY",
    "BEVERAGES",
    "BREAD/BAKERY",
    "CLEANING",
    "DAIRY",
    "EGGS",
    "FROZEN FOODS",
    "GROCERY I",
    "PRODUCE",
];

const WEEKEND_UPLIFT: f64 = 1.2;
const NOISE_FRACTION: f64 = 0.1;

/// Name of the `index`-th generated product
pub fn product_name(index: usize) -> String {
    let family = FAMILIES[index % FAMILIES.len()];
    match index / FAMILIES.len() {
        0 => family.to_string(),
        round => format!("{family} {}", round + 1),
    }
}

/// Generate `days` consecutive days of sales for `products` products
pub fn generate_store_sales(
    products: usize,
    days: usize,
    start: NaiveDate,
    seed: u64,
) -> Result<SalesTable> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(products * days);

    for index in 0..products {
        let name = product_name(index);
        let level: f64 = rng.gen_range(20.0..200.0);
        let slope: f64 = rng.gen_range(-0.05..0.25);
        let noise = Normal::new(0.0, level * NOISE_FRACTION)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        for day in 0..days {
            let date = start + Days::new(day as u64);
            let weekend = if date.weekday().number_from_monday() >= 6 {
                WEEKEND_UPLIFT
            } else {
                1.0
            };
            let value = (level + slope * day as f64) * weekend + noise.sample(&mut rng);
            rows.push(SalesRecord::new(
                date,
                name.clone(),
                name.clone(),
                round_to(value.max(0.0), 2),
            ));
        }
    }

    Ok(SalesTable::new(rows))
}

#[derive(Serialize)]
struct StoreSalesCsvRow<'a> {
    id: usize,
    date: NaiveDate,
    store_nbr: u32,
    family: &'a str,
    sales: f64,
    onpromotion: u32,
}

/// Write a table in the store-sales CSV layout read by the ingest module
pub fn write_store_sales_csv<P: AsRef<Path>>(path: P, table: &SalesTable) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for (id, row) in table.rows().iter().enumerate() {
        writer.serialize(StoreSalesCsvRow {
            id,
            date: row.date,
            store_nbr: 1,
            family: &row.product_name,
            sales: row.sales,
            onpromotion: 0,
        })?;
    }
    writer.flush()?;

    info!(rows = table.len(), path = %path.display(), "Wrote synthetic store-sales data");
    Ok(())
}
