use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, params_from_iter, Connection, Row};

use super::{
    Filter, ItemRecord, Record, Store, StoreError, StoreResult, StoreTx, TypeRecord, UserRecord,
};
use crate::types::EntityKind;

const SCHEMA: &str = r#"
PRAGMA foreign_keys=ON;

CREATE TABLE IF NOT EXISTS users (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  email TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS types (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  description TEXT
);

CREATE TABLE IF NOT EXISTS items (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  description TEXT,
  user_id TEXT NOT NULL REFERENCES users(id),
  type_id TEXT NOT NULL REFERENCES types(id)
);
"#;

/// SQLite-backed store. The connection is shared behind a mutex.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and ensure the tables exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("sqlite schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for SqliteStore {
    fn find_many(&self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Record>> {
        let conn = self.lock()?;
        select(&conn, kind, filter)
    }

    fn create(&self, record: Record) -> StoreResult<Record> {
        let conn = self.lock()?;
        insert(&conn, &record)?;
        Ok(record)
    }

    fn transaction<T, F>(&self, work: F) -> StoreResult<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> StoreResult<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let out = {
            let mut handle = SqliteTx { conn: &tx };
            work(&mut handle)?
        };
        tx.commit()?;
        Ok(out)
    }
}

struct SqliteTx<'a> {
    conn: &'a Connection,
}

impl StoreTx for SqliteTx<'_> {
    fn create(&mut self, record: Record) -> StoreResult<Record> {
        insert(self.conn, &record)?;
        Ok(record)
    }

    fn find_many(&mut self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Record>> {
        select(self.conn, kind, filter)
    }
}

fn insert(conn: &Connection, record: &Record) -> StoreResult<()> {
    let result = match record {
        Record::Type(t) => conn.execute(
            "INSERT INTO types(id, name, description) VALUES (?1, ?2, ?3)",
            params![t.id, t.name, t.description],
        ),
        Record::Item(i) => conn.execute(
            "INSERT INTO items(id, name, description, user_id, type_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![i.id, i.name, i.description, i.user_id, i.type_id],
        ),
        Record::User(u) => conn.execute(
            "INSERT INTO users(id, name, email) VALUES (?1, ?2, ?3)",
            params![u.id, u.name, u.email],
        ),
    };
    result
        .map(|_| ())
        .map_err(|e| translate(e, record.kind()))
}

fn select(conn: &Connection, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Record>> {
    let (columns, table) = match kind {
        EntityKind::Type => ("id, name, description", "types"),
        EntityKind::Item => ("id, name, description, user_id, type_id", "items"),
        EntityKind::User => ("id, name, email", "users"),
    };
    let ids: &[String] = match filter {
        Filter::All => &[],
        Filter::IdIn(ids) if ids.is_empty() => return Ok(Vec::new()),
        Filter::IdIn(ids) => ids,
    };

    let mut sql = format!("SELECT {columns} FROM {table}");
    if !ids.is_empty() {
        let placeholders = vec!["?"; ids.len()].join(", ");
        sql.push_str(&format!(" WHERE id IN ({placeholders})"));
    }
    sql.push_str(" ORDER BY rowid");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids.iter()), |row| read_record(kind, row))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn read_record(kind: EntityKind, row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(match kind {
        EntityKind::Type => Record::Type(TypeRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
        }),
        EntityKind::Item => Record::Item(ItemRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            user_id: row.get(3)?,
            type_id: row.get(4)?,
        }),
        EntityKind::User => Record::User(UserRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
        }),
    })
}

/// Map SQLite constraint failures onto the typed store errors.
fn translate(err: rusqlite::Error, kind: EntityKind) -> StoreError {
    if let rusqlite::Error::SqliteFailure(code, message) = &err {
        let detail = message.clone().unwrap_or_else(|| code.to_string());
        match code.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return StoreError::UniqueViolation {
                    entity: kind.to_string(),
                    detail,
                };
            }
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return StoreError::ForeignKeyViolation {
                    entity: kind.to_string(),
                    detail,
                };
            }
            _ => {}
        }
    }
    StoreError::Sqlite(err)
}
