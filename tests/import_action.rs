use std::sync::Arc;

use csv_seeder::import::{ActionResult, ImportAction};
use csv_seeder::ingestion::ImportOptions;
use csv_seeder::persistence::{
    Filter, MemoryStore, Record, SqliteStore, Store, StoreError, StoreResult, StoreTx, TypeRecord,
    UserRecord,
};
use csv_seeder::types::{EntityKind, ImportBatch, ParsedRow, UserId};

fn seed_user<S: Store>(store: &S, id: &str) {
    store
        .create(Record::User(UserRecord {
            id: id.to_string(),
            name: "Owner".to_string(),
            email: format!("{id}@example.com"),
        }))
        .unwrap();
}

fn seed_type<S: Store>(store: &S, id: &str) {
    store
        .create(Record::Type(TypeRecord {
            id: id.to_string(),
            name: format!("Existing {id}"),
            description: None,
        }))
        .unwrap();
}

fn item(name: &str, type_id: &str) -> ParsedRow {
    ParsedRow::from_pairs([("name", name), ("description", ""), ("type_id", type_id)])
}

fn action<S: Store>(store: &Arc<S>) -> ImportAction<S> {
    ImportAction::new(Arc::clone(store), ImportOptions::default()).unwrap()
}

fn count<S: Store>(store: &S, kind: EntityKind) -> usize {
    store.find_many(kind, &Filter::All).unwrap().len()
}

#[test]
fn items_missing_types_get_placeholders() {
    let store = Arc::new(MemoryStore::new());
    seed_user(&*store, "u1");
    seed_type(&*store, "1");

    let batch = ImportBatch::new(
        EntityKind::Item,
        vec![item("Lamp", "1"), item("Chair", "7"), item("Desk", "7"), item("Rug", "8")],
    );
    let action = action(&store);
    let result = action.run(batch, &UserId::new("u1"));

    assert_eq!(action.engine().metrics().snapshot().tasks_finished, 2);
    assert_eq!(
        result,
        ActionResult::Success {
            count: 4,
            placeholders: vec!["7".to_string(), "8".to_string()],
        }
    );
    assert_eq!(count(&*store, EntityKind::Item), 4);
    let seven = store.find_by_id(EntityKind::Type, "7").unwrap().unwrap();
    match seven {
        Record::Type(t) => assert_eq!(t.name, "Type 7"),
        other => panic!("unexpected record: {other:?}"),
    }
    // Existing types are left alone.
    match store.find_by_id(EntityKind::Type, "1").unwrap().unwrap() {
        Record::Type(t) => assert_eq!(t.name, "Existing 1"),
        other => panic!("unexpected record: {other:?}"),
    }
}

#[test]
fn items_belong_to_the_acting_user() {
    let store = Arc::new(MemoryStore::new());
    seed_user(&*store, "u1");
    seed_user(&*store, "u2");
    seed_type(&*store, "1");

    let result = action(&store).run(
        ImportBatch::new(EntityKind::Item, vec![item("Lamp", "1")]),
        &UserId::new("u2"),
    );
    assert!(result.is_success());
    let items = store.find_many(EntityKind::Item, &Filter::All).unwrap();
    match &items[0] {
        Record::Item(i) => assert_eq!(i.user_id, "u2"),
        other => panic!("unexpected record: {other:?}"),
    }
}

#[test]
fn unknown_actor_fails_without_writes() {
    let store = Arc::new(MemoryStore::new());
    let result = action(&store).run(
        ImportBatch::new(EntityKind::Item, vec![item("Lamp", "5")]),
        &UserId::new("ghost"),
    );
    assert_eq!(result.error(), Some("user not found: ghost"));
    assert_eq!(count(&*store, EntityKind::Type), 0);
    assert_eq!(count(&*store, EntityKind::Item), 0);
}

#[test]
fn unmappable_row_fails_before_reconciliation() {
    let store = Arc::new(MemoryStore::new());
    seed_user(&*store, "u1");
    let rows = vec![item("Lamp", "3"), item("  ", "4")];
    let result = action(&store).run(ImportBatch::new(EntityKind::Item, rows), &UserId::new("u1"));
    assert_eq!(result.error(), Some("invalid row 2: missing value for 'name'"));
    assert_eq!(count(&*store, EntityKind::Type), 0);
}

#[test]
fn empty_batch_succeeds_with_zero() {
    let store = Arc::new(MemoryStore::new());
    let result = action(&store).run(ImportBatch::new(EntityKind::Type, Vec::new()), &UserId::new("u1"));
    assert_eq!(result.count(), Some(0));
}

#[test]
fn duplicate_type_id_rolls_back_the_batch() {
    let store = Arc::new(MemoryStore::new());
    seed_type(&*store, "t1");
    let rows = vec![
        ParsedRow::from_pairs([("id", "t2"), ("name", "Books")]),
        ParsedRow::from_pairs([("id", "t1"), ("name", "Garden")]),
    ];
    let result = action(&store).run(ImportBatch::new(EntityKind::Type, rows), &UserId::new("u1"));
    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("unique constraint"));
    assert_eq!(count(&*store, EntityKind::Type), 1);
}

/// Memory store whose plain `create` fails for one id.
struct RejectingStore {
    inner: MemoryStore,
    reject: &'static str,
}

impl Store for RejectingStore {
    fn find_many(&self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Record>> {
        self.inner.find_many(kind, filter)
    }

    fn create(&self, record: Record) -> StoreResult<Record> {
        if record.id() == self.reject {
            return Err(StoreError::Poisoned);
        }
        self.inner.create(record)
    }

    fn transaction<T, F>(&self, work: F) -> StoreResult<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> StoreResult<T>,
    {
        self.inner.transaction(work)
    }
}

#[test]
fn failed_placeholder_keeps_the_others_and_inserts_no_items() {
    let store = Arc::new(RejectingStore {
        inner: MemoryStore::new(),
        reject: "13",
    });
    seed_user(&*store, "u1");

    let batch = ImportBatch::new(
        EntityKind::Item,
        vec![item("Lamp", "7"), item("Chair", "13"), item("Desk", "8")],
    );
    let result = action(&store).run(batch, &UserId::new("u1"));

    assert!(result.error().unwrap().contains("store lock poisoned"));
    assert_eq!(count(&*store, EntityKind::Item), 0);
    let types = store.find_many(EntityKind::Type, &Filter::All).unwrap();
    let mut ids: Vec<&str> = types.iter().map(Record::id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["7", "8"]);
}

#[test]
fn sqlite_store_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed").join("app.db");

    {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        seed_user(&*store, "u1");
        let batch = ImportBatch::new(EntityKind::Item, vec![item("Lamp", "1"), item("Chair", "2")]);
        let result = action(&store).run(batch, &UserId::new("u1"));
        assert_eq!(result.count(), Some(2));
    }

    let reopened = SqliteStore::open(&path).unwrap();
    assert_eq!(count(&reopened, EntityKind::Item), 2);
    let types = reopened.find_many(EntityKind::Type, &Filter::All).unwrap();
    let mut ids: Vec<&str> = types.iter().map(Record::id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn sqlite_unique_email_violation_leaves_no_users() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let rows = vec![
        ParsedRow::from_pairs([("name", "Ada"), ("email", "ada@example.com")]),
        ParsedRow::from_pairs([("name", "Also Ada"), ("email", "ada@example.com")]),
    ];
    let result = action(&store).run(ImportBatch::new(EntityKind::User, rows), &UserId::new("admin"));
    assert!(result.error().unwrap().contains("unique constraint"));
    assert_eq!(count(&*store, EntityKind::User), 0);
}

#[test]
fn action_result_serializes_with_status_tag() {
    let ok = ActionResult::Success {
        count: 2,
        placeholders: vec!["99".to_string()],
    };
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        serde_json::json!({"status": "success", "count": 2, "placeholders": ["99"]})
    );
    let failed = ActionResult::Failure {
        message: "boom".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        serde_json::json!({"status": "failure", "message": "boom"})
    );
}
