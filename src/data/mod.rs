//! Remote source fetchers.
//!
//! Each client normalizes one upstream source into either a clean
//! [`crate::domain::TimeSeries`] or a raw structured payload for the
//! extractors. All of them run synchronously on a blocking HTTP client,
//! propagate fetch failures without retrying, and share a caller-owned TTL
//! cache.

pub mod estat;
pub mod fred;
pub mod freight;

pub use estat::{EstatClient, TableInfo};
pub use fred::FredClient;
pub use freight::FreightSource;
