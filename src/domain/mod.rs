//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - [`TimeSeries`]: a clean month-keyed numeric series
//! - [`MasterTable`]: the joined month × series table
//! - [`SummaryRow`]: per-series latest value and month-over-month delta

pub mod series;
pub mod table;

pub use series::{TimeSeries, month_start};
pub use table::{MasterTable, SummaryRow};
