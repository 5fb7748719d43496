//! Asset identifiers of tables, records and index buckets.
//!
//! | Family | Identifier |
//! |--------|------------|
//! | table | `table:<name>` |
//! | record | `record:<table>:<key column>:<key text>` |
//! | index | `index:<table>:<column>:<key text>` |
//! | null index | `index:<table>:<column>` |
//! | all tables | `metadata:tables` |
//!
//! Key text comes from [`tabledger_codec::key_text`], so `1`, `1.0` and a
//! big integer equal to one all address the same asset.

use tabledger_codec::{key_text, Value};

/// Prefix of table definition assets.
pub const TABLE_PREFIX: &str = "table";
/// Prefix of record assets.
pub const RECORD_PREFIX: &str = "record";
/// Prefix of index assets.
pub const INDEX_PREFIX: &str = "index";
/// The asset every table definition is appended to.
pub const ALL_TABLES_ASSET_ID: &str = "metadata:tables";

const SEPARATOR: char = ':';

/// Returns the asset id of a table definition.
#[must_use]
pub fn table_asset_id(table: &str) -> String {
    join(TABLE_PREFIX, &[table], None)
}

/// Returns the asset id of the record whose primary key is `key_value`.
#[must_use]
pub fn record_asset_id(table: &str, key_column: &str, key_value: &Value) -> String {
    join(RECORD_PREFIX, &[table, key_column], Some(key_value))
}

/// Returns the asset id of the index bucket holding `value`.
///
/// A null value addresses the null bucket, which has no value component.
#[must_use]
pub fn index_asset_id(table: &str, column: &str, value: &Value) -> String {
    join(INDEX_PREFIX, &[table, column], Some(value))
}

fn join(prefix: &str, parts: &[&str], value: Option<&Value>) -> String {
    let mut id = String::from(prefix);
    for part in parts {
        id.push(SEPARATOR);
        id.push_str(part);
    }
    if let Some(text) = value.and_then(key_text) {
        id.push(SEPARATOR);
        id.push_str(&text);
    }
    id
}
