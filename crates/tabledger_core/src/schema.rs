//! Table definitions.

use crate::error::{ContractError, ContractResult, ErrorCode};
use std::fmt;
use std::str::FromStr;
use tabledger_codec::{CodecError, Value};

/// Field names of a stored table definition.
pub mod fields {
    /// Table name.
    pub const TABLE: &str = "table";
    /// Primary-key column (also the column of an index definition).
    pub const KEY: &str = "key";
    /// Primary-key type (also the type of an index definition).
    pub const KEY_TYPE: &str = "key_type";
    /// Secondary index definitions.
    pub const INDEXES: &str = "indexes";
}

/// The value types a primary key or index column may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Text values.
    String,
    /// Integer, big integer or double values.
    Number,
    /// Boolean values.
    Boolean,
}

impl KeyType {
    /// Returns the lower-case name stored in definitions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Returns true if `value` is of this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => matches!(value, Value::Text(_)),
            Self::Number => value.is_number(),
            Self::Boolean => matches!(value, Value::Bool(_)),
        }
    }
}

impl FromStr for KeyType {
    type Err = ();

    /// Parses a type name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            _ => Err(()),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `name` may name a table, key or index column.
///
/// Names start with an ASCII letter followed by ASCII letters, digits or
/// underscores. They never contain the `:` that separates asset id parts.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A secondary index on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Indexed column.
    pub key: String,
    /// Declared type of the column.
    pub key_type: KeyType,
}

impl IndexDefinition {
    /// Creates an index definition.
    pub fn new(key: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            key: key.into(),
            key_type,
        }
    }

    /// Returns true if `value` may be stored in this index.
    ///
    /// Null is always allowed and lands in the null bucket.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        value.is_null() || self.key_type.matches(value)
    }

    fn to_value(&self) -> Value {
        Value::map([
            (fields::KEY, Value::from(self.key.as_str())),
            (fields::KEY_TYPE, Value::from(self.key_type.as_str())),
        ])
    }
}

/// The schema of one table.
///
/// Definitions are written once by Create and never altered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    /// Table name.
    pub table: String,
    /// Primary-key column.
    pub key: String,
    /// Declared type of the primary key.
    pub key_type: KeyType,
    /// Secondary indexes in declaration order.
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    /// Creates a definition without indexes.
    pub fn new(table: impl Into<String>, key: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            key_type,
            indexes: Vec::new(),
        }
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Returns the index on `column`, if one is declared.
    #[must_use]
    pub fn index(&self, column: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|index| index.key == column)
    }

    /// Returns the stored document form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::map([
            (fields::TABLE, Value::from(self.table.as_str())),
            (fields::KEY, Value::from(self.key.as_str())),
            (fields::KEY_TYPE, Value::from(self.key_type.as_str())),
            (
                fields::INDEXES,
                Value::Array(self.indexes.iter().map(IndexDefinition::to_value).collect()),
            ),
        ])
    }

    /// Reads a stored definition.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the document is not a definition written by
    /// Create.
    pub fn from_value(value: &Value) -> ContractResult<Self> {
        let malformed = || ContractError::from(CodecError::invalid_structure("table definition"));
        let text = |doc: &Value, key: &str| doc.get(key).and_then(Value::as_text).map(str::to_string);
        let key_type = |doc: &Value| {
            doc.get(fields::KEY_TYPE)
                .and_then(Value::as_text)
                .and_then(|s| s.parse::<KeyType>().ok())
        };

        let indexes = value
            .get(fields::INDEXES)
            .and_then(Value::as_array)
            .ok_or_else(malformed)?
            .iter()
            .map(|doc| {
                Some(IndexDefinition {
                    key: text(doc, fields::KEY)?,
                    key_type: key_type(doc)?,
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(malformed)?;

        Ok(Self {
            table: text(value, fields::TABLE).ok_or_else(malformed)?,
            key: text(value, fields::KEY).ok_or_else(malformed)?,
            key_type: key_type(value).ok_or_else(malformed)?,
            indexes,
        })
    }
}

/// Checks a name, failing with `INVALID_OBJECT_NAME: <name>`.
pub(crate) fn check_name(name: &str) -> ContractResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ContractError::with_detail(ErrorCode::InvalidObjectName, name))
    }
}
