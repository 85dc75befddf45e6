//! Month-keyed time series.
//!
//! Every fetcher and extractor funnels its raw observations through
//! [`TimeSeries::from_observations`], which is where the cleaning rules live:
//! dates are bucketed to the first day of their month, the result is sorted
//! ascending, and duplicate months keep the last occurrence in input order.
//! Downstream code can therefore rely on strictly increasing keys.

use chrono::{Datelike, NaiveDate};

/// First day of the month containing `date`. Bucketing, not interpolation.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // from_ymd_opt with day 1 of an existing date's year/month cannot fail.
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// An ordered month → value mapping with strictly increasing keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<(NaiveDate, f64)>,
}

impl TimeSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from raw observations.
    ///
    /// Dates are normalized to month start; a stable sort keeps input order
    /// among same-month observations so "keep the last occurrence" is
    /// well-defined even when sources report differing days of month.
    pub fn from_observations(observations: Vec<(NaiveDate, f64)>) -> Self {
        let mut normalized: Vec<(NaiveDate, f64)> = observations
            .into_iter()
            .map(|(date, value)| (month_start(date), value))
            .collect();
        normalized.sort_by_key(|(date, _)| *date);

        let mut points: Vec<(NaiveDate, f64)> = Vec::with_capacity(normalized.len());
        for (date, value) in normalized {
            match points.last_mut() {
                Some((last, slot)) if *last == date => *slot = value,
                _ => points.push((date, value)),
            }
        }
        Self { points }
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last observed (month, value), if any.
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.points.last().copied()
    }

    /// Latest value minus the previous one; `None` with fewer than two
    /// observations.
    pub fn delta(&self) -> Option<f64> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        Some(self.points[n - 1].1 - self.points[n - 2].1)
    }

    /// Inner-join this series with `other` on month and map each matched
    /// value pair through `f`.
    ///
    /// Used for unit conversion, e.g. USD/ton × USDJPY ÷ 1000 → JPY/kg.
    pub fn combine<F>(&self, other: &TimeSeries, f: F) -> TimeSeries
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut points = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.points.len() && j < other.points.len() {
            let (da, va) = self.points[i];
            let (db, vb) = other.points[j];
            match da.cmp(&db) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    points.push((da, f(va, vb)));
                    i += 1;
                    j += 1;
                }
            }
        }
        TimeSeries { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn duplicate_dates_keep_the_last_value() {
        let series = TimeSeries::from_observations(vec![
            (d(2024, 1, 1), 10.0),
            (d(2024, 1, 1), 20.0),
        ]);
        assert_eq!(series.points(), &[(d(2024, 1, 1), 20.0)]);
    }

    #[test]
    fn keys_are_strictly_increasing_months() {
        let series = TimeSeries::from_observations(vec![
            (d(2024, 3, 15), 3.0),
            (d(2024, 1, 2), 1.0),
            (d(2024, 2, 28), 2.0),
            (d(2024, 1, 31), 1.5), // same month as the first, later in input
        ]);
        assert_eq!(
            series.points(),
            &[
                (d(2024, 1, 1), 1.5),
                (d(2024, 2, 1), 2.0),
                (d(2024, 3, 1), 3.0),
            ]
        );
    }

    #[test]
    fn delta_needs_two_points() {
        let one = TimeSeries::from_observations(vec![(d(2024, 1, 1), 5.0)]);
        assert_eq!(one.delta(), None);

        let three = TimeSeries::from_observations(vec![
            (d(2024, 1, 1), 100.0),
            (d(2024, 2, 1), 110.0),
            (d(2024, 3, 1), 105.0),
        ]);
        assert_eq!(three.latest(), Some((d(2024, 3, 1), 105.0)));
        assert_eq!(three.delta(), Some(-5.0));
    }

    #[test]
    fn combine_is_an_inner_join() {
        let price = TimeSeries::from_observations(vec![
            (d(2024, 1, 1), 9000.0),
            (d(2024, 2, 1), 9500.0),
            (d(2024, 3, 1), 9800.0),
        ]);
        let fx = TimeSeries::from_observations(vec![
            (d(2024, 2, 1), 150.0),
            (d(2024, 3, 1), 148.0),
            (d(2024, 4, 1), 147.0),
        ]);

        let jpy_kg = price.combine(&fx, |p, f| p * f / 1000.0);
        assert_eq!(jpy_kg.len(), 2);

        let (last_month, last_value) = jpy_kg.latest().unwrap();
        assert_eq!(last_month, d(2024, 3, 1));
        assert!((last_value - 9800.0 * 148.0 / 1000.0).abs() < 1e-9);
    }
}
