//! Error types for the simulation core

use thiserror::Error;

/// Main error type for the simulation core.
///
/// Only unrecoverable configuration problems surface through this type;
/// recoverable conditions (missing template ids, out-of-range physics
/// values) are handled locally by the owning component and logged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
