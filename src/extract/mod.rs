//! Extractors: semi-structured payloads → clean monthly series.
//!
//! Two kinds live here:
//!
//! - [`labeled`]: statistics-API JSON with classification axes, filtered by
//!   label predicates
//! - [`fiscal_pdf`]: fiscal-year index tables recovered from PDF text
//!
//! Both are best-effort by design: finding nothing is an empty series, not
//! an error.

pub mod fiscal_pdf;
pub mod labeled;

pub use fiscal_pdf::{Era, extract_fiscal_series, extract_fiscal_series_from_pdf};
pub use labeled::{LabelFilter, extract_labeled_series};
