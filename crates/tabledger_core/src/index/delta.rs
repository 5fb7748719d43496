//! Index delta entries.

use crate::error::{ContractError, ContractResult, ErrorCode};
use std::collections::BTreeMap;
use tabledger_codec::Value;
use tabledger_ledger::Ledger;

/// Field holding the age the record has once the entry is written.
pub const ADDED_AGE: &str = "age";
/// Field marking an entry as a removal.
pub const DELETED: &str = "deleted";

/// One entry of an index delta.
///
/// The primary key is stored under the table's key column, so an entry of
/// table `tbl` keyed by `pkey` reads `{pkey: "k1", age: 0}`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// Primary-key value of the record.
    pub key: Value,
    /// Age of the record version that caused the entry.
    pub age: u64,
    /// True if the record left the bucket.
    pub deleted: bool,
}

impl IndexEntry {
    /// Creates an entry adding `key` to a bucket.
    #[must_use]
    pub fn added(key: Value, age: u64) -> Self {
        Self {
            key,
            age,
            deleted: false,
        }
    }

    /// Creates an entry removing `key` from a bucket.
    #[must_use]
    pub fn deleted(key: Value, age: u64) -> Self {
        Self {
            key,
            age,
            deleted: true,
        }
    }

    /// Returns the document form; the delete marker is written only when set.
    #[must_use]
    pub fn to_value(&self, key_column: &str) -> Value {
        let mut fields = vec![
            (key_column, self.key.clone()),
            (ADDED_AGE, Value::from(self.age)),
        ];
        if self.deleted {
            fields.push((DELETED, Value::Bool(true)));
        }
        Value::map(fields)
    }

    /// Reads an entry document.
    ///
    /// # Errors
    ///
    /// Returns `ILLEGAL_INDEX_STATE` unless the document is a map holding a
    /// scalar key under `key_column`, a non-negative integer age and, if
    /// present, a boolean delete marker.
    pub fn from_value(document: &Value, key_column: &str) -> ContractResult<Self> {
        let illegal = || ContractError::new(ErrorCode::IllegalIndexState);
        let key = document
            .get(key_column)
            .filter(|key| key.is_scalar())
            .ok_or_else(illegal)?;
        let age = document
            .get(ADDED_AGE)
            .and_then(Value::as_integer)
            .and_then(|age| u64::try_from(age).ok())
            .ok_or_else(illegal)?;
        let deleted = match document.get(DELETED) {
            None => false,
            Some(marker) => marker.as_bool().ok_or_else(illegal)?,
        };
        Ok(Self {
            key: key.clone(),
            age,
            deleted,
        })
    }
}

/// Index entries produced by one invocation, grouped by bucket.
///
/// Each bucket is written once with its entries in the order they were
/// pushed, so several records moving through the same bucket in one
/// invocation all keep their entries.
#[derive(Debug, Default)]
pub struct IndexDeltas {
    key_column: String,
    buckets: BTreeMap<String, Vec<Value>>,
}

impl IndexDeltas {
    /// Creates an empty set for a table keyed by `key_column`.
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            buckets: BTreeMap::new(),
        }
    }

    /// Appends an entry to a bucket.
    pub fn push(&mut self, asset_id: String, entry: &IndexEntry) {
        self.buckets
            .entry(asset_id)
            .or_default()
            .push(entry.to_value(&self.key_column));
    }

    /// Returns the number of buckets touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if no entry was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Writes one new version per bucket.
    ///
    /// # Errors
    ///
    /// Returns the first ledger error.
    pub fn write(self, ledger: &mut dyn Ledger) -> ContractResult<()> {
        for (asset_id, entries) in self.buckets {
            ledger.put(&asset_id, Value::Array(entries))?;
        }
        Ok(())
    }
}
