//! Access-path selection.

use super::condition::{Condition, Operator};
use crate::asset_id::{index_asset_id, record_asset_id};
use crate::error::{ContractError, ContractResult, ErrorCode};
use crate::schema::TableDefinition;
use std::fmt;
use tabledger_codec::Value;

/// How a scan finds its candidate records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPath {
    /// Read one record asset.
    Record {
        /// The record asset id.
        asset_id: String,
    },
    /// Replay one index bucket.
    Index {
        /// The index asset id.
        asset_id: String,
    },
}

impl AccessPath {
    /// Returns the asset id the path reads.
    #[must_use]
    pub fn asset_id(&self) -> &str {
        match self {
            Self::Record { asset_id } | Self::Index { asset_id } => asset_id,
        }
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record { asset_id } => write!(f, "record({asset_id})"),
            Self::Index { asset_id } => write!(f, "index({asset_id})"),
        }
    }
}

/// Chooses the access path for `conditions` on `table`.
///
/// # Errors
///
/// - `INVALID_KEY_TYPE` if the primary-key operand has the wrong type
/// - `INVALID_INDEX_KEY_TYPE` if the index operand has the wrong type
/// - `INVALID_KEY_SPECIFICATION` if no condition qualifies
pub fn select_access_path(
    table: &TableDefinition,
    conditions: &[Condition],
) -> ContractResult<AccessPath> {
    let by_key = conditions
        .iter()
        .find(|c| c.column == table.key && c.operator == Operator::Eq);
    if let Some(condition) = by_key {
        let value = operand(condition);
        if !table.key_type.matches(value) {
            return Err(ContractError::new(ErrorCode::InvalidKeyType));
        }
        return Ok(AccessPath::Record {
            asset_id: record_asset_id(&table.table, &table.key, value),
        });
    }

    let by_index = conditions.iter().find_map(|c| {
        let index = table.index(&c.column)?;
        matches!(c.operator, Operator::Eq | Operator::IsNull).then_some((c, index))
    });
    if let Some((condition, index)) = by_index {
        let value = operand(condition);
        if condition.operator == Operator::Eq && !index.key_type.matches(value) {
            return Err(ContractError::new(ErrorCode::InvalidIndexKeyType));
        }
        return Ok(AccessPath::Index {
            asset_id: index_asset_id(&table.table, &index.key, value),
        });
    }

    Err(ContractError::new(ErrorCode::InvalidKeySpecification))
}

static NULL: Value = Value::Null;

// `is_null` has no operand and addresses the null bucket.
fn operand(condition: &Condition) -> &Value {
    condition.value.as_ref().unwrap_or(&NULL)
}
