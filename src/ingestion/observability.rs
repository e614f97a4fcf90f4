use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::persistence::StoreError;
use crate::types::EntityKind;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportSeverity {
    /// Informational event.
    Info,
    /// Rejected user input (bad csv, wrong columns).
    Warning,
    /// The store refused the batch (constraint violation, unmappable row).
    Error,
    /// Infrastructure failure (database unavailable, poisoned lock, worker pool).
    Critical,
}

impl ImportSeverity {
    /// Classify an error for observer callbacks.
    pub fn of(error: &ImportError) -> Self {
        match error {
            e if e.is_user_input() => Self::Warning,
            ImportError::InvalidDeclaration { .. }
            | ImportError::InvalidRow { .. }
            | ImportError::UnknownUser { .. } => Self::Error,
            ImportError::Persistence(StoreError::UniqueViolation { .. })
            | ImportError::Persistence(StoreError::ForeignKeyViolation { .. }) => Self::Error,
            ImportError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Warning,
            },
            _ => Self::Critical,
        }
    }
}

/// Which step of the paste-to-store flow an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    /// Parsing and validating pasted text.
    Validation,
    /// Reconciling foreign keys and inserting the batch.
    Persistence,
}

/// Context about an import attempt.
#[derive(Debug, Clone)]
pub struct ImportContext {
    pub stage: ImportStage,
    /// Target entity, when known.
    pub kind: Option<EntityKind>,
    /// Rows involved in the attempt (0 if parsing failed).
    pub rows: usize,
}

/// Minimal stats reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    /// Rows accepted (validation) or inserted (persistence).
    pub rows: usize,
    /// Placeholder dependency records created during reconciliation.
    pub placeholders: usize,
}

/// Observer interface for import outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ImportObserver: Send + Sync {
    /// Called when a stage succeeds.
    fn on_success(&self, _ctx: &ImportContext, _stats: ImportStats) {}

    /// Called when a stage fails.
    fn on_failure(&self, _ctx: &ImportContext, _severity: ImportSeverity, _error: &ImportError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Report `result` to `observer`, alerting at or above `alert_at_or_above`.
pub(crate) fn report(
    observer: Option<&Arc<dyn ImportObserver>>,
    alert_at_or_above: ImportSeverity,
    ctx: &ImportContext,
    result: Result<ImportStats, &ImportError>,
) {
    let Some(obs) = observer else {
        return;
    };
    match result {
        Ok(stats) => obs.on_success(ctx, stats),
        Err(e) => {
            let sev = ImportSeverity::of(e);
            obs.on_failure(ctx, sev, e);
            if sev >= alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ImportObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ImportObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ImportObserver for CompositeObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits import events as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ImportObserver for TracingObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        tracing::info!(
            stage = ?ctx.stage,
            kind = ?ctx.kind,
            rows = stats.rows,
            placeholders = stats.placeholders,
            "import stage succeeded"
        );
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::warn!(
            stage = ?ctx.stage,
            kind = ?ctx.kind,
            rows = ctx.rows,
            ?severity,
            %error,
            "import stage failed"
        );
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::error!(
            stage = ?ctx.stage,
            kind = ?ctx.kind,
            rows = ctx.rows,
            ?severity,
            %error,
            "import alert"
        );
    }
}

/// Appends import events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ImportObserver for FileObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        self.append_line(&format!(
            "{} ok stage={:?} kind={} rows={} placeholders={}",
            unix_ts(),
            ctx.stage,
            kind_label(ctx.kind),
            stats.rows,
            stats.placeholders
        ));
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.append_line(&format!(
            "{} fail severity={:?} stage={:?} kind={} rows={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            kind_label(ctx.kind),
            ctx.rows,
            error
        ));
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} stage={:?} kind={} rows={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            kind_label(ctx.kind),
            ctx.rows,
            error
        ));
    }
}

fn kind_label(kind: Option<EntityKind>) -> &'static str {
    kind.map(|k| k.as_str()).unwrap_or("-")
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
