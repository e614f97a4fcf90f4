use thiserror::Error;

use crate::persistence::StoreError;

/// Convenience result type for parsing, validation and import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Error type shared by the parser, validator, generator declarations and import action.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The pasted text is not well-formed CSV (bad quoting, empty input, bad header).
    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// A header row was found but no data rows followed it.
    #[error("no data rows found in csv")]
    EmptyResult,

    /// A row's key set differs from the header's (or, without a header, the first row's).
    #[error(
        "row {row} (line {line}) has different columns than the header: missing={missing:?} unexpected={unexpected:?}"
    )]
    InconsistentColumns {
        row: usize,
        line: u64,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// One or more declared required columns are absent from the header.
    #[error("missing required columns: {}", missing.join(", "))]
    MissingRequiredColumns { missing: Vec<String> },

    /// A cell holds a value outside the column's declared value options.
    #[error("row {row} column '{column}': value '{value}' is not one of [{}]", allowed.join(", "))]
    ValueNotAllowed {
        row: usize,
        column: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Column declarations are malformed (duplicate key, unknown generator hint, ...).
    #[error("invalid column declaration: {message}")]
    InvalidDeclaration { message: String },

    /// A validated row cannot be turned into a record of the target entity.
    #[error("invalid row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    /// The acting user does not exist in the store.
    #[error("user not found: {id}")]
    UnknownUser { id: String },

    /// Underlying CSV reader/writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The persistence store rejected an operation.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Settings could not be decoded.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// Reading a settings file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker pool used for concurrent creates could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ImportError {
    /// `true` for errors raised before anything reaches the persistence layer.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::EmptyResult
                | Self::InconsistentColumns { .. }
                | Self::MissingRequiredColumns { .. }
                | Self::ValueNotAllowed { .. }
        )
    }
}
