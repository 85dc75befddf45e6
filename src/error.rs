//! Crate-wide error type.
//!
//! One enum covers the whole failure taxonomy so every layer can return
//! `Result<_, DashError>` and the binary can map variants onto stable exit
//! codes. Note what is *not* here: an extractor finding nothing is an empty
//! `TimeSeries`, never an error — emptiness is a valid result that the
//! presentation layer decides how to render.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashError {
    /// A required API credential is absent from the environment.
    #[error("missing credential {name}: set it in the environment or .env")]
    MissingCredential { name: &'static str },

    /// Network failure or non-success HTTP status from a required source.
    /// Never retried automatically.
    #[error("fetch from {source_name} failed: {message}")]
    RemoteFetch {
        source_name: String,
        message: String,
    },

    /// A JSON response is missing required structure (e.g. an error document
    /// where the statistical payload should be).
    #[error("malformed payload from {source_name}: {message}")]
    MalformedPayload {
        source_name: String,
        message: String,
    },

    /// A listing page contained no link matching the expected pattern.
    /// The URL is carried so the message alone is enough to diagnose an
    /// upstream layout change.
    #[error("no matching document link found on listing page {listing_url}")]
    Discovery { listing_url: String },

    /// Writing an export artifact (workbook, chart image, CSV) failed.
    #[error("export failed: {0}")]
    Export(String),

    /// Invalid command-line input.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

impl DashError {
    /// Exit code convention: 2 = configuration/input, 3 = export I/O,
    /// 4 = remote data problem.
    pub fn exit_code(&self) -> u8 {
        match self {
            DashError::MissingCredential { .. } | DashError::InvalidArg(_) => 2,
            DashError::Export(_) => 3,
            DashError::RemoteFetch { .. }
            | DashError::MalformedPayload { .. }
            | DashError::Discovery { .. } => 4,
        }
    }

    /// Shorthand used by the fetchers.
    pub fn fetch(source: impl Into<String>, message: impl Into<String>) -> Self {
        DashError::RemoteFetch {
            source_name: source.into(),
            message: message.into(),
        }
    }

    /// Shorthand used where a payload is structurally unusable.
    pub fn payload(source: impl Into<String>, message: impl Into<String>) -> Self {
        DashError::MalformedPayload {
            source_name: source.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_convention() {
        assert_eq!(
            DashError::MissingCredential { name: "FRED_API_KEY" }.exit_code(),
            2
        );
        assert_eq!(DashError::fetch("fred", "timeout").exit_code(), 4);
        assert_eq!(
            DashError::Discovery {
                listing_url: "https://example.com/list".into()
            }
            .exit_code(),
            4
        );
        assert_eq!(DashError::Export("disk full".into()).exit_code(), 3);
    }
}
