//! Ingestion action: foreign-key reconciliation and transactional batch insert.
//!
//! [`ImportAction::run`] consumes an [`ImportBatch`] of validated rows:
//!
//! 1. every row is mapped to a store record (nothing is written if one cannot be);
//! 2. ids referenced through the kind's foreign-key column that are missing from the store get a
//!    placeholder record, created concurrently;
//! 3. all records are inserted in one store transaction.
//!
//! Failures at any step are logged, reported to the configured observer and returned as
//! [`ActionResult::Failure`]; the action never returns an error or panics on store failures.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use csv_seeder::import::ImportAction;
//! use csv_seeder::ingestion::ImportOptions;
//! use csv_seeder::persistence::MemoryStore;
//! use csv_seeder::types::{EntityKind, ImportBatch, ParsedRow, UserId};
//!
//! # fn main() -> Result<(), csv_seeder::ImportError> {
//! let action = ImportAction::new(Arc::new(MemoryStore::new()), ImportOptions::default())?;
//! let batch = ImportBatch::new(
//!     EntityKind::Type,
//!     vec![ParsedRow::from_pairs([("name", "Books")])],
//! );
//! let result = action.run(batch, &UserId::new("nobody"));
//! assert_eq!(result.count(), Some(1));
//! # Ok(())
//! # }
//! ```

mod records;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{ImportError, ImportResult};
use crate::execution::{ExecutionEngine, TracingExecutionObserver};
use crate::ingestion::observability::{report, ImportContext, ImportStage, ImportStats};
use crate::ingestion::ImportOptions;
use crate::persistence::{Filter, Record, Store};
use crate::types::{EntityKind, ForeignKey, ImportBatch, ParsedRow, UserId};

use records::{placeholder, record_from_row};

/// Outcome of [`ImportAction::run`]: a row count or an error message, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult {
    Success {
        /// Rows inserted.
        count: usize,
        /// Ids of placeholder dependency records created for this batch.
        placeholders: Vec<String>,
    },
    Failure {
        message: String,
    },
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Inserted row count on success.
    pub fn count(&self) -> Option<usize> {
        match self {
            Self::Success { count, .. } => Some(*count),
            Self::Failure { .. } => None,
        }
    }

    /// Error message on failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message } => Some(message),
        }
    }
}

struct Inserted {
    count: usize,
    placeholders: Vec<String>,
}

/// Imports validated batches into a [`Store`].
pub struct ImportAction<S: Store> {
    store: Arc<S>,
    engine: ExecutionEngine,
    options: ImportOptions,
}

impl<S: Store> fmt::Debug for ImportAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportAction")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<S: Store> ImportAction<S> {
    /// Create an action writing to `store`. Fails only if the worker pool cannot be built.
    pub fn new(store: Arc<S>, options: ImportOptions) -> ImportResult<Self> {
        let engine = ExecutionEngine::new(options.execution.clone())?
            .with_observer(Arc::new(TracingExecutionObserver));
        Ok(Self {
            store,
            engine,
            options,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Engine running the concurrent placeholder creates; exposes its metrics.
    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    /// Import `batch` on behalf of `actor`.
    pub fn run(&self, batch: ImportBatch, actor: &UserId) -> ActionResult {
        let ctx = ImportContext {
            stage: ImportStage::Persistence,
            kind: Some(batch.kind),
            rows: batch.len(),
        };
        tracing::debug!(kind = %batch.kind, rows = batch.len(), actor = %actor, "importing batch");

        match self.try_run(batch, actor) {
            Ok(inserted) => {
                tracing::info!(
                    kind = ?ctx.kind,
                    count = inserted.count,
                    placeholders = inserted.placeholders.len(),
                    "batch imported"
                );
                let stats = ImportStats {
                    rows: inserted.count,
                    placeholders: inserted.placeholders.len(),
                };
                self.report(&ctx, Ok(stats));
                ActionResult::Success {
                    count: inserted.count,
                    placeholders: inserted.placeholders,
                }
            }
            Err(e) => {
                tracing::error!(kind = ?ctx.kind, rows = ctx.rows, error = %e, "error importing batch");
                self.report(&ctx, Err(&e));
                ActionResult::Failure {
                    message: e.to_string(),
                }
            }
        }
    }

    fn try_run(&self, batch: ImportBatch, actor: &UserId) -> ImportResult<Inserted> {
        let ImportBatch { kind, rows } = batch;

        let records = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| record_from_row(kind, idx + 1, row, actor))
            .collect::<ImportResult<Vec<Record>>>()?;

        if kind.is_user_owned() && self.store.find_by_id(EntityKind::User, actor.as_str())?.is_none() {
            return Err(ImportError::UnknownUser {
                id: actor.to_string(),
            });
        }

        let placeholders = match kind.foreign_key() {
            Some(fk) => self.reconcile(fk, &rows)?,
            None => Vec::new(),
        };

        let count = records.len();
        self.store.transaction(move |tx| {
            for record in records {
                tx.create(record)?;
            }
            Ok(count)
        })?;

        Ok(Inserted {
            count,
            placeholders,
        })
    }

    /// Create placeholders for referenced ids missing from the store; returns their ids.
    ///
    /// Creates are independent: if one fails, the first error is returned and placeholders
    /// already created stay in the store.
    fn reconcile(&self, fk: ForeignKey, rows: &[ParsedRow]) -> ImportResult<Vec<String>> {
        let referenced = distinct_values(rows, fk.column);
        if referenced.is_empty() {
            return Ok(Vec::new());
        }

        let existing: HashSet<String> = self
            .store
            .find_many(fk.target, &Filter::IdIn(referenced.clone()))?
            .into_iter()
            .map(|r| r.id().to_string())
            .collect();
        let missing: Vec<String> = referenced
            .into_iter()
            .filter(|id| !existing.contains(id))
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(target_kind = %fk.target, missing = missing.len(), "creating placeholders");

        let store = &*self.store;
        let created = self.engine.run_all(missing, |id: String| -> ImportResult<String> {
            let record = store.create(placeholder(fk.target, &id)?)?;
            tracing::debug!(target_kind = %fk.target, id = %record.id(), "placeholder created");
            Ok(id)
        });
        created.into_iter().collect()
    }

    fn report(&self, ctx: &ImportContext, result: Result<ImportStats, &ImportError>) {
        report(
            self.options.observer.as_ref(),
            self.options.alert_at_or_above,
            ctx,
            result,
        );
    }
}

/// Distinct non-blank trimmed values of `column`, in first-seen order.
fn distinct_values(rows: &[ParsedRow], column: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| row.get(column))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::distinct_values;
    use crate::types::ParsedRow;

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let rows = vec![
            ParsedRow::from_pairs([("type_id", "2")]),
            ParsedRow::from_pairs([("type_id", " 1 ")]),
            ParsedRow::from_pairs([("type_id", "2")]),
            ParsedRow::from_pairs([("type_id", "")]),
            ParsedRow::from_pairs([("type_id", "1")]),
        ];
        assert_eq!(distinct_values(&rows, "type_id"), vec!["2".to_string(), "1".to_string()]);
    }
}
