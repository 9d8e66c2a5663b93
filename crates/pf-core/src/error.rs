//! Typed error definitions for the portfolio-flow helpers.
//!
//! Status lookups and deduplication never fail; [`PfError`] only covers
//! loading configuration and parsing override values. All variants implement
//! `std::error::Error` via `thiserror`, so they convert into `anyhow::Result`
//! at the binary boundary.

use thiserror::Error;

/// Domain-specific errors for the portfolio-flow helpers.
#[derive(Debug, Error)]
pub enum PfError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Override value or event payload parsing error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reading a config or event file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
