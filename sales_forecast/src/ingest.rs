//! Loading the raw sales datasets into the standardized schema
//!
//! Two sources are understood:
//!
//! - the Superstore export (`Order Date`, `Product Name`, `Category`, `Sales`,
//!   day-first dates)
//! - the store-sales time series (`date`, `family`, `sales`, one row per store),
//!   where `family` is both the product and the category
//!
//! Missing files are skipped. Rows with a missing or unparseable date, a
//! missing product or a missing sales value are dropped; a sales value that is
//! present but not numeric counts as zero.

use crate::config::PipelineConfig;
use crate::data::{SalesRecord, SalesTable};
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Category used when a source row has none
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A row as read from a source, before cleaning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub date: Option<NaiveDate>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub sales: Option<String>,
}

/// Locations of the raw datasets
#[derive(Debug, Clone)]
pub struct DataSources {
    /// Superstore `train.csv`
    pub superstore: PathBuf,
    /// Store-sales `train.csv`
    pub store_sales: PathBuf,
}

#[derive(Debug, Deserialize)]
struct SuperstoreRow {
    #[serde(rename = "Order Date")]
    order_date: Option<String>,
    #[serde(rename = "Product Name")]
    product_name: Option<String>,
    #[serde(rename = "Category")]
    category: Option<String>,
    #[serde(rename = "Sales")]
    sales: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StoreSalesRow {
    date: Option<String>,
    family: Option<String>,
    sales: Option<String>,
}

impl DataSources {
    /// Default layout under a data root
    pub fn under(root: &Path) -> Self {
        Self {
            superstore: root.join("superstore-sales").join("train.csv"),
            store_sales: root
                .join("store-sales-time-series-forecasting")
                .join("train.csv"),
        }
    }

    /// Sources named by a pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        let defaults = Self::under(&config.data_root);
        Self {
            superstore: config
                .superstore_path
                .clone()
                .unwrap_or(defaults.superstore),
            store_sales: config
                .store_sales_path
                .clone()
                .unwrap_or(defaults.store_sales),
        }
    }
}

/// Parse a day-first date (`31/12/2017`), falling back to ISO
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| parse_iso(s))
}

/// Parse an ISO date, tolerating a trailing time component
pub fn parse_iso(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Load the Superstore export
pub fn load_superstore<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();

    for (line, row) in reader.deserialize::<SuperstoreRow>().enumerate() {
        match row {
            Ok(row) => out.push(RawRecord {
                date: row.order_date.as_deref().and_then(parse_day_first),
                product_name: row.product_name,
                category: row.category,
                sales: row.sales,
            }),
            Err(e) => warn!(path = %path.display(), line = line + 2, "Skipping malformed row: {e}"),
        }
    }

    Ok(out)
}

/// Load the store-sales time series; `family` becomes product and category
pub fn load_store_sales<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();

    for (line, row) in reader.deserialize::<StoreSalesRow>().enumerate() {
        match row {
            Ok(row) => out.push(RawRecord {
                date: row.date.as_deref().and_then(parse_iso),
                category: row.family.clone(),
                product_name: row.family,
                sales: row.sales,
            }),
            Err(e) => warn!(path = %path.display(), line = line + 2, "Skipping malformed row: {e}"),
        }
    }

    Ok(out)
}

/// Load every source that exists on disk
pub fn load_and_standardize(sources: &DataSources) -> Result<Vec<RawRecord>> {
    let mut rows = Vec::new();

    if sources.superstore.exists() {
        let loaded = load_superstore(&sources.superstore)?;
        info!(rows = loaded.len(), path = %sources.superstore.display(), "Loaded superstore data");
        rows.extend(loaded);
    } else {
        debug!(path = %sources.superstore.display(), "Superstore data not found");
    }

    if sources.store_sales.exists() {
        let loaded = load_store_sales(&sources.store_sales)?;
        info!(rows = loaded.len(), path = %sources.store_sales.display(), "Loaded store-sales data");
        rows.extend(loaded);
    } else {
        debug!(path = %sources.store_sales.display(), "Store-sales data not found");
    }

    Ok(rows)
}

/// Drop incomplete rows and sum sales per (date, product, category)
///
/// The result is ordered by product, then date.
pub fn clean_and_aggregate(rows: Vec<RawRecord>) -> SalesTable {
    let mut totals: BTreeMap<(String, NaiveDate, String), f64> = BTreeMap::new();
    let mut dropped = 0usize;

    for row in rows {
        let (Some(date), Some(product), Some(sales)) = (row.date, row.product_name, row.sales)
        else {
            dropped += 1;
            continue;
        };
        if product.trim().is_empty() || sales.trim().is_empty() {
            dropped += 1;
            continue;
        }
        let sales = sales
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        let category = row
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        *totals.entry((product, date, category)).or_insert(0.0) += sales;
    }

    if dropped > 0 {
        debug!(dropped, "Dropped incomplete rows");
    }

    SalesTable::new(
        totals
            .into_iter()
            .map(|((product, date, category), sales)| SalesRecord {
                date,
                product_name: product,
                category,
                sales,
            })
            .collect(),
    )
}

/// Load, standardize, clean and aggregate the configured sources
pub fn get_preprocessed(config: &PipelineConfig) -> Result<SalesTable> {
    let rows = load_and_standardize(&DataSources::from_config(config))?;
    Ok(clean_and_aggregate(rows))
}

/// Sorted list of unique product names
pub fn get_products(table: &SalesTable) -> Vec<String> {
    table.products()
}
