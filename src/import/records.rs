//! Mapping validated rows onto store records.

use crate::error::{ImportError, ImportResult};
use crate::persistence::{ItemRecord, Record, TypeRecord, UserRecord};
use crate::types::{EntityKind, ParsedRow, UserId};

/// Build the record for data row `row` (1-based) of a `kind` batch.
///
/// An `id` column is honored when present and non-empty; otherwise a v4 uuid is assigned.
/// Blank optional fields become `None`.
pub(crate) fn record_from_row(
    kind: EntityKind,
    row: usize,
    data: &ParsedRow,
    actor: &UserId,
) -> ImportResult<Record> {
    let id = optional(data, "id").unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let record = match kind {
        EntityKind::Type => Record::Type(TypeRecord {
            id,
            name: required(data, row, "name")?,
            description: optional(data, "description"),
        }),
        EntityKind::Item => Record::Item(ItemRecord {
            id,
            name: required(data, row, "name")?,
            description: optional(data, "description"),
            user_id: actor.as_str().to_string(),
            type_id: required(data, row, "type_id")?,
        }),
        EntityKind::User => Record::User(UserRecord {
            id,
            name: required(data, row, "name")?,
            email: required(data, row, "email")?,
        }),
    };
    Ok(record)
}

/// Minimal dependent record standing in for a referenced id that does not exist yet.
pub(crate) fn placeholder(target: EntityKind, id: &str) -> ImportResult<Record> {
    match target {
        EntityKind::Type => Ok(Record::Type(TypeRecord {
            id: id.to_string(),
            name: format!("Type {id}"),
            description: Some(format!("Auto-generated type {id}")),
        })),
        EntityKind::User => Ok(Record::User(UserRecord {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@placeholder.invalid"),
        })),
        EntityKind::Item => Err(ImportError::InvalidDeclaration {
            message: "items cannot be created as placeholders".to_string(),
        }),
    }
}

fn required(data: &ParsedRow, row: usize, key: &str) -> ImportResult<String> {
    optional(data, key).ok_or_else(|| ImportError::InvalidRow {
        row,
        message: format!("missing value for '{key}'"),
    })
}

fn optional(data: &ParsedRow, key: &str) -> Option<String> {
    data.get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{placeholder, record_from_row};
    use crate::error::ImportError;
    use crate::persistence::Record;
    use crate::types::{EntityKind, ParsedRow, UserId};

    #[test]
    fn item_rows_are_owned_by_the_actor() {
        let row = ParsedRow::from_pairs([("name", " Lamp "), ("description", ""), ("type_id", "2")]);
        let record = record_from_row(EntityKind::Item, 1, &row, &UserId::new("u1")).unwrap();
        match record {
            Record::Item(item) => {
                assert_eq!(item.name, "Lamp");
                assert_eq!(item.description, None);
                assert_eq!(item.user_id, "u1");
                assert_eq!(item.type_id, "2");
                assert!(uuid::Uuid::parse_str(&item.id).is_ok());
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn explicit_id_column_is_kept() {
        let row = ParsedRow::from_pairs([("id", "t-7"), ("name", "Books")]);
        let record = record_from_row(EntityKind::Type, 1, &row, &UserId::new("u1")).unwrap();
        assert_eq!(record.id(), "t-7");
    }

    #[test]
    fn blank_required_value_names_row_and_column() {
        let row = ParsedRow::from_pairs([("name", "Ada"), ("email", "  ")]);
        let err = record_from_row(EntityKind::User, 4, &row, &UserId::new("u1")).unwrap_err();
        match err {
            ImportError::InvalidRow { row, message } => {
                assert_eq!(row, 4);
                assert!(message.contains("'email'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn type_placeholder_has_generated_name() {
        match placeholder(EntityKind::Type, "99").unwrap() {
            Record::Type(t) => {
                assert_eq!(t.id, "99");
                assert_eq!(t.name, "Type 99");
                assert_eq!(t.description.as_deref(), Some("Auto-generated type 99"));
            }
            other => panic!("unexpected record: {other:?}"),
        }
        assert!(placeholder(EntityKind::Item, "1").is_err());
    }
}
