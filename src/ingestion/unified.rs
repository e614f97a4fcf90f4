//! Unified paste-to-rows entrypoint.
//!
//! Most callers should use [`parse_and_validate`] (or [`submit_pasted`] for a submit handler),
//! which runs the parser and the validator over pasted text and reports the outcome to the
//! configured [`ImportObserver`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ImportResult;
use crate::execution::ExecutionOptions;
use crate::types::{ColumnSet, ParsedRow};

use super::csv::parse_csv_with_headers;
use super::observability::{report, ImportContext, ImportObserver, ImportSeverity, ImportStage, ImportStats};
use super::validate::{validate_against_header, ValueOptionPolicy};

/// Options controlling validation, observability and the import action's worker pool.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ImportOptions {
    /// Whether declared value options reject non-matching cells.
    pub value_option_policy: ValueOptionPolicy,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ImportObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ImportSeverity,
    /// Worker pool used for concurrent placeholder creation.
    pub execution: ExecutionOptions,
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("value_option_policy", &self.value_option_policy)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("execution", &self.execution)
            .finish()
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            value_option_policy: ValueOptionPolicy::default(),
            observer: None,
            alert_at_or_above: ImportSeverity::Critical,
            execution: ExecutionOptions::default(),
        }
    }
}

/// Result of checking pasted text: the accepted rows, or human-readable problems.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted(Vec<ParsedRow>),
    Rejected(Vec<String>),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Accepted rows, if any.
    pub fn rows(&self) -> Option<&[ParsedRow]> {
        match self {
            Self::Accepted(rows) => Some(rows),
            Self::Rejected(_) => None,
        }
    }

    /// Problems found; empty when accepted.
    pub fn problems(&self) -> &[String] {
        match self {
            Self::Accepted(_) => &[],
            Self::Rejected(problems) => problems,
        }
    }

    pub fn into_rows(self) -> Option<Vec<ParsedRow>> {
        match self {
            Self::Accepted(rows) => Some(rows),
            Self::Rejected(_) => None,
        }
    }
}

/// Parse and validate pasted text, keeping the typed error.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with the accepted row count
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```rust
/// use csv_seeder::ingestion::{ingest_from_text, ImportOptions};
/// use csv_seeder::types::{ColumnDeclaration, ColumnSet};
///
/// # fn main() -> Result<(), csv_seeder::ImportError> {
/// let columns = ColumnSet::new(vec![ColumnDeclaration::new("a", "A").required()])?;
/// let rows = ingest_from_text("a,b\n1,2\n3,4", &columns, &ImportOptions::default())?;
/// assert_eq!(rows[1].get("b"), Some("4"));
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_text(
    text: &str,
    columns: &ColumnSet,
    options: &ImportOptions,
) -> ImportResult<Vec<ParsedRow>> {
    let result = parse_csv_with_headers(text).and_then(|(headers, rows)| {
        validate_against_header(&headers, rows, columns, options.value_option_policy)
    });

    let ctx = ImportContext {
        stage: ImportStage::Validation,
        kind: None,
        rows: result.as_ref().map(Vec::len).unwrap_or(0),
    };
    match &result {
        Ok(rows) => {
            tracing::debug!(rows = rows.len(), "pasted csv accepted");
            report(
                options.observer.as_ref(),
                options.alert_at_or_above,
                &ctx,
                Ok(ImportStats {
                    rows: rows.len(),
                    placeholders: 0,
                }),
            );
        }
        Err(e) => {
            tracing::debug!(error = %e, "pasted csv rejected");
            report(options.observer.as_ref(), options.alert_at_or_above, &ctx, Err(e));
        }
    }

    result
}

/// Parse and validate pasted text for display.
///
/// Never fails: problems are returned as messages in [`ValidationOutcome::Rejected`].
pub fn parse_and_validate(
    text: &str,
    columns: &ColumnSet,
    options: &ImportOptions,
) -> ValidationOutcome {
    match ingest_from_text(text, columns, options) {
        Ok(rows) => ValidationOutcome::Accepted(rows),
        Err(e) => ValidationOutcome::Rejected(vec![e.to_string()]),
    }
}

/// Submit pasted text: validated rows go to `on_submit`, otherwise the error is returned and
/// `on_submit` is never called.
///
/// ```rust
/// use std::sync::Arc;
///
/// use csv_seeder::import::ImportAction;
/// use csv_seeder::ingestion::{submit_pasted, ImportOptions};
/// use csv_seeder::persistence::MemoryStore;
/// use csv_seeder::presets::type_columns;
/// use csv_seeder::types::{EntityKind, ImportBatch, UserId};
///
/// # fn main() -> Result<(), csv_seeder::ImportError> {
/// let options = ImportOptions::default();
/// let action = ImportAction::new(Arc::new(MemoryStore::new()), options.clone())?;
/// let actor = UserId::new("u1");
///
/// let result = submit_pasted("name,description\nBooks,Paper", &type_columns(), &options, |rows| {
///     action.run(ImportBatch::new(EntityKind::Type, rows), &actor)
/// })?;
/// assert_eq!(result.count(), Some(1));
/// # Ok(())
/// # }
/// ```
pub fn submit_pasted<F, R>(
    text: &str,
    columns: &ColumnSet,
    options: &ImportOptions,
    on_submit: F,
) -> ImportResult<R>
where
    F: FnOnce(Vec<ParsedRow>) -> R,
{
    ingest_from_text(text, columns, options).map(on_submit)
}

/// Owned request object, for callers that queue paste validations.
#[derive(Debug, Clone)]
pub struct PasteRequest {
    /// Raw pasted text.
    pub text: String,
    /// Column declarations to validate against.
    pub columns: ColumnSet,
    /// Options controlling validation.
    pub options: ImportOptions,
}

impl PasteRequest {
    /// Execute the request by calling [`parse_and_validate`].
    pub fn run(&self) -> ValidationOutcome {
        parse_and_validate(&self.text, &self.columns, &self.options)
    }
}
