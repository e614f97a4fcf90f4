//! Pasted-text ingestion: parsing, validation and reporting.
//!
//! Most callers should use [`parse_and_validate`] or [`submit_pasted`] (from [`unified`]) which:
//!
//! - parse pasted CSV into [`crate::types::ParsedRow`]s
//! - validate them against a [`crate::types::ColumnSet`]
//! - optionally report success/failure/alerts to an [`ImportObserver`]
//!
//! The individual steps are also available under:
//! - [`csv`]
//! - [`validate`]

pub mod csv;
pub mod observability;
pub mod unified;
pub mod validate;

pub use csv::{parse_csv_text, parse_csv_with_headers, rows_from_text, CsvRows, EXTRA_FIELDS_KEY};
pub use observability::{
    CompositeObserver, FileObserver, ImportContext, ImportObserver, ImportSeverity, ImportStage,
    ImportStats, TracingObserver,
};
pub use unified::{
    ingest_from_text, parse_and_validate, submit_pasted, ImportOptions, PasteRequest,
    ValidationOutcome,
};
pub use validate::{validate_against_header, validate_rows, ValueOptionPolicy};
