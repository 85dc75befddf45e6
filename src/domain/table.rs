//! The master month × series table.
//!
//! All source series are outer-joined on their normalized month index. Gaps
//! are explicit `None`s — never interpolated — and summary figures are taken
//! per column, since different sources publish with different lags.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::TimeSeries;

/// One named column of the master table, parallel to `MasterTable::months`.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Month-indexed table with one row per month present in any source.
///
/// Invariant: `months` is strictly increasing at month granularity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterTable {
    months: Vec<NaiveDate>,
    columns: Vec<MasterColumn>,
}

/// Derived per-series summary: latest non-null value and the delta against
/// the previous non-null one (`None` with fewer than two observations).
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub name: String,
    pub latest_month: NaiveDate,
    pub latest: f64,
    pub delta: Option<f64>,
}

impl MasterTable {
    /// Outer-join the given named series.
    ///
    /// Series keys are already month-normalized (a `TimeSeries` invariant),
    /// so the joined index is simply the sorted union of all keys.
    pub fn from_series(inputs: &[(&str, &TimeSeries)]) -> Self {
        let months: Vec<NaiveDate> = inputs
            .iter()
            .flat_map(|(_, series)| series.points().iter().map(|(month, _)| *month))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = inputs
            .iter()
            .map(|(name, series)| {
                let mut values = vec![None; months.len()];
                let mut row = 0;
                for &(month, value) in series.points() {
                    while row < months.len() && months[row] < month {
                        row += 1;
                    }
                    if row < months.len() && months[row] == month {
                        values[row] = Some(value);
                    }
                }
                MasterColumn {
                    name: (*name).to_string(),
                    values,
                }
            })
            .collect();

        Self { months, columns }
    }

    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    pub fn columns(&self) -> &[MasterColumn] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Latest month carrying at least one non-null value.
    pub fn latest_month(&self) -> Option<NaiveDate> {
        self.months
            .iter()
            .enumerate()
            .rev()
            .find(|(row, _)| self.columns.iter().any(|c| c.values[*row].is_some()))
            .map(|(_, month)| *month)
    }

    /// Recover one column as a series, dropping nulls.
    pub fn column_series(&self, name: &str) -> Option<TimeSeries> {
        let column = self.columns.iter().find(|c| c.name == name)?;
        let observations = self
            .months
            .iter()
            .zip(&column.values)
            .filter_map(|(month, value)| value.map(|v| (*month, v)))
            .collect();
        Some(TimeSeries::from_observations(observations))
    }

    /// Per-column summary rows, in column order. Columns with no
    /// observations at all are omitted.
    pub fn summary(&self) -> Vec<SummaryRow> {
        self.columns
            .iter()
            .filter_map(|column| {
                let observed: Vec<(NaiveDate, f64)> = self
                    .months
                    .iter()
                    .zip(&column.values)
                    .filter_map(|(month, value)| value.map(|v| (*month, v)))
                    .collect();
                let &(latest_month, latest) = observed.last()?;
                let delta = (observed.len() >= 2)
                    .then(|| latest - observed[observed.len() - 2].1);
                Some(SummaryRow {
                    name: column.name.clone(),
                    latest_month,
                    latest,
                    delta,
                })
            })
            .collect()
    }
}
