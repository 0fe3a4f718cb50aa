//! Sales tables and per-product daily series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeSet;

/// Minimum number of observations a model can be fitted on
pub const MIN_TRAINING_POINTS: usize = 2;

/// Below this length a product is skipped by the evaluating pipeline
pub const MIN_EVALUATION_POINTS: usize = 10;

/// One standardized row: daily sales of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Day of the observation
    pub date: NaiveDate,
    /// Product identifier
    pub product_name: String,
    /// Product category, `"Unknown"` when the source has none
    pub category: String,
    /// Units or revenue sold that day
    pub sales: f64,
}

impl SalesRecord {
    pub fn new(
        date: NaiveDate,
        product_name: impl Into<String>,
        category: impl Into<String>,
        sales: f64,
    ) -> Self {
        Self {
            date,
            product_name: product_name.into(),
            category: category.into(),
            sales,
        }
    }
}

/// Standardized sales table with one row per (date, product)
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    rows: Vec<SalesRecord>,
}

/// Ordered daily observations for one product
///
/// Dates are strictly increasing and every value is a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    points: Vec<(NaiveDate, f64)>,
}

impl SalesTable {
    /// Wrap already-standardized rows
    pub fn new(rows: Vec<SalesRecord>) -> Self {
        Self { rows }
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Get the rows
    pub fn rows(&self) -> &[SalesRecord] {
        &self.rows
    }

    /// Sorted list of unique product names
    pub fn products(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.product_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Build the daily series of one product
    ///
    /// An unknown product yields an empty series rather than an error, so
    /// callers must check the length before fitting.
    pub fn series_for(&self, product: &str) -> Series {
        Series::from_points(
            self.rows
                .iter()
                .filter(|r| r.product_name == product)
                .map(|r| (r.date, r.sales)),
        )
    }
}

impl Series {
    /// Build a series from unordered observations
    ///
    /// Sorts by date, drops NaN values and keeps the first occurrence of a
    /// duplicated date.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut points: Vec<(NaiveDate, f64)> =
            points.into_iter().filter(|(_, v)| !v.is_nan()).collect();
        // Stable sort so "first occurrence" means first in input order
        points.sort_by_key(|(date, _)| *date);
        points.dedup_by_key(|(date, _)| *date);
        Self { points }
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Get the (date, value) pairs
    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    /// Get the dates as a vector
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }

    /// Get the values as a vector
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    /// Last observed date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Mean of all values, NaN for an empty series
    pub fn mean(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).mean()
    }

    /// Split into the first `index` points and the rest
    pub fn split_at(&self, index: usize) -> (Series, Series) {
        let (head, tail) = self.points.split_at(index.min(self.points.len()));
        (
            Series {
                points: head.to_vec(),
            },
            Series {
                points: tail.to_vec(),
            },
        )
    }
}
