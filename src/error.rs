use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Company;

/// Fatal errors surfaced to the binary.
///
/// Each variant maps to a process exit code, so `main` stays a thin wrapper:
/// - `2`: configuration or local I/O problems
/// - `4`: degenerate arithmetic or remote data problems
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad/missing arguments, unparseable months, invalid scenario files.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cost arithmetic would produce an infinite or undefined value.
    #[error("Domain error at {date} / {company}: {message}")]
    Domain {
        date: NaiveDate,
        company: Company,
        message: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Provider request or response problems (`fetch-eia`, `fetch-vast`).
    #[error("Fetch error: {0}")]
    Fetch(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Configuration(_) | AppError::Io { .. } => 2,
            AppError::Domain { .. } | AppError::Fetch(_) => 4,
        }
    }
}

/// An external table that exists but cannot be used as-is.
///
/// Never fatal: the loader turns it into a skipped source and defaults stand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeMismatch {
    #[error("table is empty")]
    Empty,
    #[error("missing required column `{0}`")]
    MissingColumn(String),
    #[error("unreadable table: {0}")]
    Unreadable(String),
}

/// A numeric cell that could not be parsed after cleanup.
///
/// Never fatal: the coercion guard treats the cell as missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read `{raw}` as a number")]
pub struct CoercionError {
    pub raw: String,
}
