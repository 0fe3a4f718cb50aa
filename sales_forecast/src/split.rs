//! Train/validation split of a product series

use crate::data::Series;

/// Default size of the trailing validation window
pub const DEFAULT_VALIDATION_DAYS: usize = 30;

/// Split a series into training data and a trailing validation window
///
/// The last `val_days` points are held out. When the series is not longer
/// than the window, everything is training data and the validation part is
/// empty.
pub fn split_train_validation(series: &Series, val_days: usize) -> (Series, Series) {
    if series.len() <= val_days {
        return (series.clone(), Series::default());
    }
    series.split_at(series.len() - val_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use rstest::rstest;

    fn series_of(len: u64) -> Series {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        Series::from_points((0..len).map(|i| (start + Days::new(i), i as f64)))
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(10, 10, 0)]
    #[case(30, 30, 0)]
    #[case(31, 1, 30)]
    #[case(35, 5, 30)]
    #[case(100, 70, 30)]
    fn test_split_sizes(#[case] len: u64, #[case] train: usize, #[case] validation: usize) {
        let (t, v) = split_train_validation(&series_of(len), DEFAULT_VALIDATION_DAYS);
        assert_eq!(t.len(), train);
        assert_eq!(v.len(), validation);
    }

    #[test]
    fn test_validation_is_the_tail() {
        let series = series_of(40);
        let (train, validation) = split_train_validation(&series, 30);
        assert_eq!(train.last_date().unwrap() + Days::new(1), validation.first_date().unwrap());
        assert_eq!(validation.last_date(), series.last_date());
    }
}
