//! Core data model: column declarations, parsed rows and import batches.
//!
//! Callers describe the fields they expect with a [`ColumnSet`] of [`ColumnDeclaration`]s. The
//! parser produces [`ParsedRow`]s, and validated rows travel to the import action inside an
//! [`ImportBatch`].

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ImportError, ImportResult};
use crate::generation::ValueGenerator;

/// One allowed value of an enumerated or foreign-key column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueOption {
    /// The value itself; a JSON number or string.
    pub value: serde_json::Value,
    /// Human-readable meaning of the value (e.g. the referenced row's name).
    pub description: String,
}

impl ValueOption {
    /// Create a value option.
    pub fn new(value: impl Into<serde_json::Value>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
        }
    }

    /// The value as it appears in a CSV cell (strings unquoted).
    pub fn as_cell(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// The value as a literal inside a prompt (strings double-quoted).
    pub fn as_literal(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }
}

/// Caller-supplied description of one expected CSV column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDeclaration {
    /// Header key; unique within a [`ColumnSet`].
    pub key: String,
    /// Display label.
    pub label: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Whether the header must contain this key.
    pub required: bool,
    /// Enumerated or foreign-key values, in display order.
    pub value_options: Vec<ValueOption>,
    /// Generator used for example values.
    pub generator: Option<ValueGenerator>,
}

impl ColumnDeclaration {
    /// Create an optional column with no description, options or generator.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: None,
            required: false,
            value_options: Vec::new(),
            generator: None,
        }
    }

    /// Mark the column as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_options(mut self, options: Vec<ValueOption>) -> Self {
        self.value_options = options;
        self
    }

    pub fn with_generator(mut self, generator: ValueGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Attach a generator from a dotted hint such as `"commerce.productName"`.
    ///
    /// Unknown hints are rejected here rather than producing placeholder values later.
    pub fn with_generator_hint(self, hint: &str) -> ImportResult<Self> {
        let generator = hint.parse::<ValueGenerator>()?;
        Ok(self.with_generator(generator))
    }

    /// Description if present, otherwise the label.
    pub fn description_or_label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.label)
    }

    /// Placeholder used when no example value can be produced.
    pub fn placeholder(&self) -> String {
        format!("[{} example]", self.label)
    }
}

/// An ordered set of column declarations with unique keys.
///
/// An empty set means "no shape constraints".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<ColumnDeclaration>,
}

impl ColumnSet {
    /// Build a set, rejecting empty or duplicate keys.
    pub fn new(columns: Vec<ColumnDeclaration>) -> ImportResult<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if col.key.trim().is_empty() {
                return Err(ImportError::InvalidDeclaration {
                    message: format!("column '{}' has an empty key", col.label),
                });
            }
            if !seen.insert(col.key.as_str()) {
                return Err(ImportError::InvalidDeclaration {
                    message: format!("duplicate column key '{}'", col.key),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Built-in declaration sets whose keys are known to be unique.
    pub(crate) fn from_known(columns: Vec<ColumnDeclaration>) -> Self {
        debug_assert!(Self::new(columns.clone()).is_ok());
        Self { columns }
    }

    /// A set with no declarations.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDeclaration> {
        self.columns.iter()
    }

    /// Look up a declaration by key.
    pub fn get(&self, key: &str) -> Option<&ColumnDeclaration> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Keys marked required, in declaration order.
    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.required)
            .map(|c| c.key.as_str())
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }
}

/// One CSV data line decoded into an ordered key -> raw value mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    line: u64,
    fields: Vec<(String, String)>,
}

impl ParsedRow {
    /// Create a row read from 1-based source `line`.
    pub fn new(line: u64, fields: Vec<(String, String)>) -> Self {
        Self { line, fields }
    }

    /// Build a row from key/value pairs with no source line (0).
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            line: 0,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 1-based line in the pasted text; 0 when not parsed from text.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Keys in CSV column order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Keys as an order-insensitive set.
    pub fn key_set(&self) -> BTreeSet<&str> {
        self.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ParsedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Target entity of an import batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    Type,
    User,
}

/// A column that references another entity by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Column holding the referenced id.
    pub column: &'static str,
    /// Entity the id refers to.
    pub target: EntityKind,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Type => "type",
            Self::User => "user",
        }
    }

    /// The foreign-key column reconciled before inserting rows of this kind.
    pub fn foreign_key(&self) -> Option<ForeignKey> {
        match self {
            Self::Item => Some(ForeignKey {
                column: "type_id",
                target: Self::Type,
            }),
            Self::Type | Self::User => None,
        }
    }

    /// Whether rows of this kind are owned by the acting user.
    pub fn is_user_owned(&self) -> bool {
        matches!(self, Self::Item)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the user performing an import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated rows bound for one atomic insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBatch {
    pub kind: EntityKind,
    pub rows: Vec<ParsedRow>,
}

impl ImportBatch {
    pub fn new(kind: EntityKind, rows: Vec<ParsedRow>) -> Self {
        Self { kind, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
