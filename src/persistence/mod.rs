//! Persistence boundary used by the import action.
//!
//! The import path needs only three store operations ([`Store::find_many`], [`Store::create`]
//! and [`Store::transaction`]) plus uniqueness-violation signalling through [`StoreError`].
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process tables with primary-key, unique-email and foreign-key checks
//! - [`SqliteStore`]: a SQLite database via `rusqlite`

mod memory;
mod sqlite;

use thiserror::Error;

use crate::types::EntityKind;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors signalled by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A primary key or unique column already holds the value.
    #[error("unique constraint violated on {entity}: {detail}")]
    UniqueViolation { entity: String, detail: String },

    /// A referenced row does not exist.
    #[error("foreign key constraint violated on {entity}: {detail}")]
    ForeignKeyViolation { entity: String, detail: String },

    /// Any other SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Creating the database directory failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// A row of the `types` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// A row of the `items` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    pub type_id: String,
}

/// A row of the `users` table. `email` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Any persisted entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Type(TypeRecord),
    Item(ItemRecord),
    User(UserRecord),
}

impl Record {
    pub fn id(&self) -> &str {
        match self {
            Self::Type(r) => &r.id,
            Self::Item(r) => &r.id,
            Self::User(r) => &r.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Type(_) => EntityKind::Type,
            Self::Item(_) => EntityKind::Item,
            Self::User(_) => EntityKind::User,
        }
    }
}

/// Row selection for [`Store::find_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every row of the table.
    All,
    /// Rows whose id is in the list.
    IdIn(Vec<String>),
}

/// Store operations available inside [`Store::transaction`].
pub trait StoreTx {
    fn create(&mut self, record: Record) -> StoreResult<Record>;

    fn find_many(&mut self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Record>>;
}

/// A persistence store shared by concurrent callers.
pub trait Store: Send + Sync {
    /// Read rows of `kind` matching `filter`, in insertion order.
    fn find_many(&self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Record>>;

    /// Insert one record outside any caller transaction.
    fn create(&self, record: Record) -> StoreResult<Record>;

    /// Run `work` atomically: every write commits if it returns `Ok`, none do otherwise.
    fn transaction<T, F>(&self, work: F) -> StoreResult<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> StoreResult<T>;

    /// Fetch one record by id.
    fn find_by_id(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>> {
        let mut found = self.find_many(kind, &Filter::IdIn(vec![id.to_string()]))?;
        Ok(found.pop())
    }
}
