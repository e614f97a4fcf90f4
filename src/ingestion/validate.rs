//! Shape validation of parsed rows against column declarations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::types::{ColumnSet, ParsedRow};

/// Whether declared value options constrain submitted data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOptionPolicy {
    /// Value options only feed example generation (default).
    #[default]
    Advisory,
    /// Non-empty cells of a column with value options must match one of them.
    Enforce,
}

/// Validate parsed rows.
///
/// Checks, in order, stopping at the first violation:
///
/// 1. every row has the same key set as the first row (order-insensitive);
/// 2. if `columns` is non-empty, all required keys are present;
/// 3. with [`ValueOptionPolicy::Enforce`], cells match their column's value options.
///
/// On success the rows are returned unchanged. Rows that are all short (or all long) by the
/// same amount pass step 1; use [`validate_against_header`] when the header is known.
pub fn validate_rows(
    rows: Vec<ParsedRow>,
    columns: &ColumnSet,
    policy: ValueOptionPolicy,
) -> ImportResult<Vec<ParsedRow>> {
    let Some(first) = rows.first() else {
        return Err(ImportError::EmptyResult);
    };
    check_keys_match(&first.key_set(), &rows)?;
    check_columns(&rows, columns, policy)?;
    Ok(rows)
}

/// Validate rows parsed under `headers`: every row's key set must equal the header's.
///
/// The remaining checks are those of [`validate_rows`].
pub fn validate_against_header(
    headers: &[String],
    rows: Vec<ParsedRow>,
    columns: &ColumnSet,
    policy: ValueOptionPolicy,
) -> ImportResult<Vec<ParsedRow>> {
    if rows.is_empty() {
        return Err(ImportError::EmptyResult);
    }
    let expected: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    check_keys_match(&expected, &rows)?;
    check_columns(&rows, columns, policy)?;
    Ok(rows)
}

fn check_columns(rows: &[ParsedRow], columns: &ColumnSet, policy: ValueOptionPolicy) -> ImportResult<()> {
    check_required_columns(&rows[0], columns)?;
    if policy == ValueOptionPolicy::Enforce {
        check_value_options(rows, columns)?;
    }
    Ok(())
}

fn check_keys_match(expected: &BTreeSet<&str>, rows: &[ParsedRow]) -> ImportResult<()> {
    for (idx, row) in rows.iter().enumerate() {
        let actual = row.key_set();
        if actual == *expected {
            continue;
        }
        return Err(ImportError::InconsistentColumns {
            row: idx + 1,
            line: row.line(),
            missing: difference(expected, &actual),
            unexpected: difference(&actual, expected),
        });
    }
    Ok(())
}

fn difference(left: &BTreeSet<&str>, right: &BTreeSet<&str>) -> Vec<String> {
    left.difference(right).map(|k| (*k).to_string()).collect()
}

fn check_required_columns(first: &ParsedRow, columns: &ColumnSet) -> ImportResult<()> {
    if columns.is_empty() {
        return Ok(());
    }
    let missing: Vec<String> = columns
        .required_keys()
        .filter(|key| !first.contains_key(key))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::MissingRequiredColumns { missing })
    }
}

fn check_value_options(rows: &[ParsedRow], columns: &ColumnSet) -> ImportResult<()> {
    for col in columns.iter().filter(|c| !c.value_options.is_empty()) {
        let allowed: Vec<String> = col.value_options.iter().map(|o| o.as_cell()).collect();
        for (idx, row) in rows.iter().enumerate() {
            let Some(raw) = row.get(&col.key) else {
                continue;
            };
            let value = raw.trim();
            if value.is_empty() || allowed.iter().any(|a| a == value) {
                continue;
            }
            return Err(ImportError::ValueNotAllowed {
                row: idx + 1,
                column: col.key.clone(),
                value: value.to_string(),
                allowed,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_against_header, validate_rows, ValueOptionPolicy};
    use crate::error::ImportError;
    use crate::ingestion::csv::{parse_csv_text, parse_csv_with_headers};
    use crate::types::{ColumnDeclaration, ColumnSet, ParsedRow, ValueOption};

    fn name_email_required() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDeclaration::new("name", "Name").required(),
            ColumnDeclaration::new("email", "Email").required(),
        ])
        .unwrap()
    }

    #[test]
    fn consistent_rows_pass_unchanged() {
        let rows = parse_csv_text("name,email\nAda,a@x.com\nGrace,g@x.com").unwrap();
        let out = validate_rows(rows.clone(), &name_email_required(), ValueOptionPolicy::Advisory)
            .unwrap();
        assert_eq!(out, rows);
    }

    #[test]
    fn key_order_does_not_matter() {
        let rows = vec![
            ParsedRow::from_pairs([("a", "1"), ("b", "2")]),
            ParsedRow::from_pairs([("b", "3"), ("a", "4")]),
        ];
        assert!(validate_rows(rows, &ColumnSet::empty(), ValueOptionPolicy::Advisory).is_ok());
    }

    #[test]
    fn extra_field_makes_rows_inconsistent() {
        let rows = parse_csv_text("name\nAda\nGrace,extra").unwrap();
        let err = validate_rows(rows, &ColumnSet::empty(), ValueOptionPolicy::Advisory).unwrap_err();
        match err {
            ImportError::InconsistentColumns {
                row,
                line,
                missing,
                unexpected,
            } => {
                assert_eq!(row, 2);
                assert_eq!(line, 3);
                assert!(missing.is_empty());
                assert_eq!(unexpected, vec!["__parsed_extra".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn uniformly_short_rows_miss_header_columns() {
        let (headers, rows) = parse_csv_with_headers("name,description\nLamp\nChair").unwrap();
        assert!(validate_rows(rows.clone(), &ColumnSet::empty(), ValueOptionPolicy::Advisory).is_ok());

        let err = validate_against_header(&headers, rows, &ColumnSet::empty(), ValueOptionPolicy::Advisory)
            .unwrap_err();
        match err {
            ImportError::InconsistentColumns {
                row,
                line,
                missing,
                unexpected,
            } => {
                assert_eq!(row, 1);
                assert_eq!(line, 2);
                assert_eq!(missing, vec!["description".to_string()]);
                assert!(unexpected.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn uniformly_long_rows_carry_unexpected_fields() {
        let (headers, rows) = parse_csv_with_headers("name\nAda,x\nGrace,y").unwrap();
        let err = validate_against_header(&headers, rows, &ColumnSet::empty(), ValueOptionPolicy::Advisory)
            .unwrap_err();
        match err {
            ImportError::InconsistentColumns { row, unexpected, .. } => {
                assert_eq!(row, 1);
                assert_eq!(unexpected, vec!["__parsed_extra".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rows_matching_the_header_pass() {
        let (headers, rows) = parse_csv_with_headers("name,email\nAda,a@x.com").unwrap();
        let out = validate_against_header(&headers, rows.clone(), &name_email_required(), ValueOptionPolicy::Advisory)
            .unwrap();
        assert_eq!(out, rows);
    }

    #[test]
    fn missing_required_columns_are_named_in_declaration_order() {
        let cols = ColumnSet::new(vec![
            ColumnDeclaration::new("a", "A").required(),
            ColumnDeclaration::new("b", "B").required(),
            ColumnDeclaration::new("c", "C").required(),
        ])
        .unwrap();
        let rows = vec![ParsedRow::from_pairs([("a", "1")])];
        let err = validate_rows(rows, &cols, ValueOptionPolicy::Advisory).unwrap_err();
        match err {
            ImportError::MissingRequiredColumns { missing } => {
                assert_eq!(missing, vec!["b".to_string(), "c".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_declarations_impose_no_required_columns() {
        let rows = vec![ParsedRow::from_pairs([("anything", "1")])];
        assert!(validate_rows(rows, &ColumnSet::empty(), ValueOptionPolicy::Advisory).is_ok());
    }

    #[test]
    fn shape_is_checked_before_required_columns() {
        let rows = vec![
            ParsedRow::from_pairs([("x", "1")]),
            ParsedRow::from_pairs([("y", "1")]),
        ];
        let err = validate_rows(rows, &name_email_required(), ValueOptionPolicy::Advisory)
            .unwrap_err();
        assert!(matches!(err, ImportError::InconsistentColumns { .. }));
    }

    fn difficulty() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDeclaration::new("difficulty", "Difficulty").with_options(vec![
                ValueOption::new("easy", "Beginner level"),
                ValueOption::new("hard", "Advanced level"),
            ]),
        ])
        .unwrap()
    }

    #[test]
    fn value_options_are_advisory_by_default() {
        let rows = vec![ParsedRow::from_pairs([("difficulty", "impossible")])];
        assert!(validate_rows(rows, &difficulty(), ValueOptionPolicy::Advisory).is_ok());
    }

    #[test]
    fn enforced_value_options_reject_unknown_values() {
        let rows = vec![
            ParsedRow::from_pairs([("difficulty", " easy ")]),
            ParsedRow::from_pairs([("difficulty", "")]),
            ParsedRow::from_pairs([("difficulty", "impossible")]),
        ];
        let err = validate_rows(rows, &difficulty(), ValueOptionPolicy::Enforce).unwrap_err();
        match err {
            ImportError::ValueNotAllowed {
                row, column, value, ..
            } => {
                assert_eq!(row, 3);
                assert_eq!(column, "difficulty");
                assert_eq!(value, "impossible");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn enforced_numeric_options_match_their_cell_text() {
        let cols = ColumnSet::new(vec![
            ColumnDeclaration::new("type_id", "Type")
                .with_options(vec![ValueOption::new(1, "Electronics"), ValueOption::new(2, "Clothing")]),
        ])
        .unwrap();
        let rows = vec![ParsedRow::from_pairs([("type_id", "2")])];
        assert!(validate_rows(rows, &cols, ValueOptionPolicy::Enforce).is_ok());
    }
}
