//! `csv-seeder` turns pasted CSV text into validated rows and inserts them into a store.
//!
//! The flow has four steps, each usable on its own:
//!
//! - [`ingestion::parse_csv_text`]: pasted text to [`types::ParsedRow`]s (header line gives the keys)
//! - [`ingestion::validate_rows`]: shape checks against a [`types::ColumnSet`]
//! - [`generation`]: example CSV and an LLM prompt describing the declared columns
//! - [`import::ImportAction::run`]: foreign-key reconciliation and a transactional batch insert
//!
//! [`ingestion::parse_and_validate`] and [`ingestion::submit_pasted`] wire the first two together
//! and report outcomes to an optional [`ingestion::ImportObserver`].
//!
//! ## Quick example: paste, validate, import
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use csv_seeder::import::ImportAction;
//! use csv_seeder::ingestion::{parse_and_validate, ImportOptions, ValidationOutcome};
//! use csv_seeder::persistence::MemoryStore;
//! use csv_seeder::presets::user_columns;
//! use csv_seeder::types::{EntityKind, ImportBatch, UserId};
//!
//! # fn main() -> Result<(), csv_seeder::ImportError> {
//! let text = "name,email,role_id,status\n\
//!             Ada Lovelace,ada@example.com,1,active\n\
//!             Grace Hopper,grace@example.com,3,pending";
//! let options = ImportOptions::default();
//!
//! let rows = match parse_and_validate(text, &user_columns(), &options) {
//!     ValidationOutcome::Accepted(rows) => rows,
//!     ValidationOutcome::Rejected(problems) => panic!("{problems:?}"),
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let action = ImportAction::new(Arc::clone(&store), options)?;
//! let result = action.run(ImportBatch::new(EntityKind::User, rows), &UserId::new("admin"));
//! assert_eq!(result.count(), Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: parser, validator, unified entrypoints and observers
//! - [`generation`]: value generators, example CSV and prompt text
//! - [`import`]: the ingestion action
//! - [`persistence`]: the [`persistence::Store`] trait with in-memory and SQLite implementations
//! - [`execution`]: bounded parallel execution used for concurrent creates
//! - [`presets`]: built-in column declaration sets
//! - [`config`]: deserializable settings
//! - [`types`]: declarations, rows and entity kinds
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod execution;
pub mod generation;
pub mod import;
pub mod ingestion;
pub mod persistence;
pub mod presets;
pub mod types;

pub use error::{ImportError, ImportResult};
