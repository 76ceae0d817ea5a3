//! Error types for term-analyze.
//!
//! All errors produced by the pipeline are represented by [`TermError`]. The
//! variants follow the stage that raises them:
//!
//! | Stage        | Variants                                   | Fatal |
//! |--------------|--------------------------------------------|-------|
//! | Loader       | `FileNotFound`, `EmptyData`, `Parse`       | yes   |
//! | Validator    | `MissingColumns`                           | yes   |
//! | Preprocessor | `InvalidConfig` (per column, as a warning) | no    |
//! | Writer       | `Write` (per artifact, collected)          | no    |

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::writers::ArtifactKind;

/// The main error type for term-analyze.
#[derive(Error, Debug)]
pub enum TermError {
    /// The input path does not exist or is not a regular file.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The input file has no data rows.
    #[error("No data rows in {}", path.display())]
    EmptyData { path: PathBuf },

    /// The input is not valid delimited text.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One or more required columns are absent.
    #[error("Missing required columns: {}", missing.join(", "))]
    MissingColumns {
        /// Every absent column, in the order it was requested
        missing: Vec<String>,
    },

    /// A preprocessing option cannot be applied to a column.
    #[error("Invalid configuration for column '{column}': {reason}")]
    InvalidConfig { column: String, reason: String },

    /// An output artifact could not be written.
    #[error("Failed to write {artifact} to {}: {source}", path.display())]
    Write {
        /// Which artifact failed
        artifact: ArtifactKind,
        /// Destination path
        path: PathBuf,
        /// Underlying cause (permission denied, disk full, ...)
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, TermError>`.
pub type Result<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Creates a parse error that wraps the underlying cause.
    pub fn parse_with_source(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an invalid configuration warning for a column.
    pub fn invalid_config(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Creates a write error for an artifact.
    pub fn write(
        artifact: ArtifactKind,
        path: impl AsRef<Path>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Write {
            artifact,
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        }
    }

    /// Short label shown in front of user-visible messages.
    pub fn category(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "File Error",
            Self::EmptyData { .. } | Self::Parse { .. } => "Data Error",
            Self::MissingColumns { .. } => "Validation Error",
            Self::InvalidConfig { .. } => "Configuration Warning",
            Self::Write { .. } => "Write Error",
            _ => "Unexpected Error",
        }
    }

    /// An actionable hint for the user, where one exists.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::FileNotFound { .. } => {
                Some("Check the --input path, or create the data file first")
            }
            Self::EmptyData { .. } => {
                Some("The file needs a header row followed by at least one data row")
            }
            Self::Parse { .. } => {
                Some("Make sure every row has the same number of fields as the header")
            }
            Self::MissingColumns { .. } => {
                Some("Column names are case-sensitive; compare them with the file header")
            }
            Self::InvalidConfig { .. } => {
                Some("Use --fill-method mode, forward or backward for text columns")
            }
            Self::Write { .. } => Some("Make sure the output directory exists and is writable"),
            _ => None,
        }
    }

    /// Process exit code reported by the command-line front end.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::EmptyData { .. } | Self::Parse { .. } => 3,
            Self::MissingColumns { .. } => 4,
            Self::Write { .. } => 5,
            _ => 1,
        }
    }

    /// Whether this error aborts a run. Column warnings and artifact failures do not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidConfig { .. } | Self::Write { .. })
    }

    /// The I/O error kind behind a write or I/O failure, if there is one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io(e) => Some(e.kind()),
            Self::Write { source, .. } => {
                let mut current: Option<&(dyn std::error::Error + 'static)> = Some(source.as_ref());
                while let Some(err) = current {
                    if let Some(io) = err.downcast_ref::<std::io::Error>() {
                        return Some(io.kind());
                    }
                    current = err.source();
                }
                None
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TermError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for TermError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Internal(format!("formatting failed: {err}"))
    }
}
