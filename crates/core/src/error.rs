//! Error types for specdex

use std::fmt;

use thiserror::Error;

/// What kind of catalog entry a name was looked up as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Index,
    Kernel,
    Band,
    Constant,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Index => "spectral index",
            Self::Kernel => "kernel",
            Self::Band => "band",
            Self::Constant => "constant",
        };
        f.write_str(s)
    }
}

/// Main error type for specdex operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("{name} is not a valid {kind}")]
    UnknownName { kind: EntryKind, name: String },

    #[error("{} missing in the parameters for {definition} computation", quote_list(.missing))]
    MissingParameter {
        definition: String,
        missing: Vec<String>,
    },

    #[error("incompatible operands: {0}")]
    IncompatibleOperands(String),

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("invalid formula `{formula}`: {reason}")]
    InvalidFormula { formula: String, reason: String },

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for an [`Error::UnknownName`].
    pub fn unknown(kind: EntryKind, name: impl Into<String>) -> Self {
        Self::UnknownName {
            kind,
            name: name.into(),
        }
    }
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for specdex operations
pub type Result<T> = std::result::Result<T, Error>;
