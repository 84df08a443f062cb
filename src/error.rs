//! Error types for configuration inference and alignment.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for rusty-cohort operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which side of an alignment a config sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The input side.
    X,
    /// The target side.
    Y,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::X => write!(f, "x"),
            Side::Y => write!(f, "y"),
        }
    }
}

/// Errors raised while building or aligning configs.
///
/// Every variant is terminal for the call that produced it; nothing in this
/// crate retries.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A pattern matched no paths once exclusions were applied.
    #[error("No filepaths found that match {pattern}")]
    NoFilesFound {
        /// The glob that was resolved, joined to its base directory.
        pattern: String,
    },

    /// A tabular source file does not exist.
    #[error("No file found at {}", path.display())]
    FileNotFound {
        /// The resolved path.
        path: PathBuf,
    },

    /// Alignment was requested but one side carries no identifiers.
    #[error("`{side}` is missing ids. {hint}")]
    MissingIdentifiers {
        /// The side lacking identifiers.
        side: Side,
        /// Variant-specific guidance for the caller.
        hint: String,
    },

    /// The two identifier sets are disjoint.
    #[error("No matches found between `x` ids and `y` ids. Double check your config.")]
    NoIdentifierOverlap,

    /// An identifier occurs more than once on one side of an alignment.
    #[error("`{side}` has duplicate id '{id}'; each sample needs a unique id to be aligned")]
    DuplicateIdentifier {
        /// The side holding the duplicate.
        side: Side,
        /// The repeated identifier.
        id: String,
    },

    /// The inference dispatcher could not classify a specification.
    #[error("Unsupported specification: {0}")]
    UnsupportedSpecification(String),

    /// Sub-configs of a composite config have different lengths.
    #[error("Composed config {index} has {found} values but config 0 has {expected}")]
    ComposeLengthMismatch {
        /// Position of the offending sub-config.
        index: usize,
        /// Length of the first sub-config.
        expected: usize,
        /// Length of the offending sub-config.
        found: usize,
    },

    /// A requested column is absent from a table.
    #[error("Column '{column}' not found in {}", path.display())]
    ColumnNotFound {
        /// The missing column.
        column: String,
        /// The table that was searched.
        path: PathBuf,
    },

    /// A file extension has no reader or decoder.
    #[error("Unsupported file extension for {}", path.display())]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,
    },

    /// A glob or `{id}` template could not be compiled or applied.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// What went wrong.
        reason: String,
    },

    /// An array literal is ragged, empty, or has no sample axis.
    #[error("Invalid array: {0}")]
    InvalidArray(String),

    /// Indexed access past the end of a config.
    #[error("Index {index} out of bounds for config with {len} values")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The config length.
        len: usize,
    },

    /// A table parsed but its contents are unusable.
    #[error("Malformed table {}: {message}", path.display())]
    MalformedTable {
        /// The table path.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Remote content could not be materialised locally.
    #[error("Fetch failed under {}: {message}", root.display())]
    Fetch {
        /// The dataset root passed to the fetcher.
        root: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// CSV/TSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error while reading a parquet table.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while reading a table.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Image decoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ConfigError {
    /// Creates an I/O error annotated with the path involved.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Creates an unsupported specification error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedSpecification(reason.into())
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
