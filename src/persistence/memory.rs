use std::sync::{Mutex, MutexGuard};

use super::{
    Filter, ItemRecord, Record, Store, StoreError, StoreResult, StoreTx, TypeRecord, UserRecord,
};
use crate::types::EntityKind;

/// In-process store with the same constraints as the SQLite schema.
///
/// Transactions stage writes on a copy of the tables and swap it in on success.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    types: Vec<TypeRecord>,
    items: Vec<ItemRecord>,
    users: Vec<UserRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn find_many(&self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Record>> {
        Ok(self.lock()?.select(kind, filter))
    }

    fn create(&self, record: Record) -> StoreResult<Record> {
        self.lock()?.insert(record)
    }

    fn transaction<T, F>(&self, work: F) -> StoreResult<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> StoreResult<T>,
    {
        let mut tables = self.lock()?;
        let mut staged = tables.clone();
        let out = work(&mut staged)?;
        *tables = staged;
        Ok(out)
    }
}

impl StoreTx for Tables {
    fn create(&mut self, record: Record) -> StoreResult<Record> {
        self.insert(record)
    }

    fn find_many(&mut self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Record>> {
        Ok(self.select(kind, filter))
    }
}

impl Tables {
    fn select(&self, kind: EntityKind, filter: &Filter) -> Vec<Record> {
        let keep = |id: &str| match filter {
            Filter::All => true,
            Filter::IdIn(ids) => ids.iter().any(|i| i == id),
        };
        match kind {
            EntityKind::Type => self
                .types
                .iter()
                .filter(|r| keep(&r.id))
                .cloned()
                .map(Record::Type)
                .collect(),
            EntityKind::Item => self
                .items
                .iter()
                .filter(|r| keep(&r.id))
                .cloned()
                .map(Record::Item)
                .collect(),
            EntityKind::User => self
                .users
                .iter()
                .filter(|r| keep(&r.id))
                .cloned()
                .map(Record::User)
                .collect(),
        }
    }

    fn insert(&mut self, record: Record) -> StoreResult<Record> {
        match &record {
            Record::Type(t) => {
                if self.types.iter().any(|r| r.id == t.id) {
                    return Err(duplicate(EntityKind::Type, "id", &t.id));
                }
                self.types.push(t.clone());
            }
            Record::Item(i) => {
                if self.items.iter().any(|r| r.id == i.id) {
                    return Err(duplicate(EntityKind::Item, "id", &i.id));
                }
                if !self.types.iter().any(|r| r.id == i.type_id) {
                    return Err(dangling(EntityKind::Item, "type_id", &i.type_id));
                }
                if !self.users.iter().any(|r| r.id == i.user_id) {
                    return Err(dangling(EntityKind::Item, "user_id", &i.user_id));
                }
                self.items.push(i.clone());
            }
            Record::User(u) => {
                if self.users.iter().any(|r| r.id == u.id) {
                    return Err(duplicate(EntityKind::User, "id", &u.id));
                }
                if self.users.iter().any(|r| r.email == u.email) {
                    return Err(duplicate(EntityKind::User, "email", &u.email));
                }
                self.users.push(u.clone());
            }
        }
        Ok(record)
    }
}

fn duplicate(kind: EntityKind, column: &str, value: &str) -> StoreError {
    StoreError::UniqueViolation {
        entity: kind.to_string(),
        detail: format!("{column}='{value}' already exists"),
    }
}

fn dangling(kind: EntityKind, column: &str, value: &str) -> StoreError {
    StoreError::ForeignKeyViolation {
        entity: kind.to_string(),
        detail: format!("{column}='{value}' does not exist"),
    }
}
