//! Utility functions for the sales_forecast crate

use chrono::{Days, NaiveDate};

/// Consecutive daily dates following `last_date`
///
/// The first date is the day after `last_date`. Dates past the end of the
/// calendar are cut off.
pub fn future_dates(last_date: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(horizon);
    let mut current = last_date;

    for _ in 0..horizon {
        match current.checked_add_days(Days::new(1)) {
            Some(next) => {
                dates.push(next);
                current = next;
            }
            None => break,
        }
    }

    dates
}
