//! `costdash` library crate.
//!
//! The binary (`costdash`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., a future hosted/dashboard front-end)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod extract;
pub mod report;
