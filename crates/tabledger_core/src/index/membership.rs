//! Index membership replay.

use super::delta::IndexEntry;
use crate::error::{ContractError, ContractResult, ErrorCode};
use std::collections::BTreeMap;
use tabledger_codec::{key_text, Value};
use tabledger_ledger::Asset;

/// Replays the versions of an index bucket into its current members.
///
/// `versions` must be in ascending age order. A delete marker removes a key
/// whatever its earlier state, and a later add restores it. Members are
/// returned ordered by the key text of their primary key.
///
/// # Errors
///
/// Returns `ILLEGAL_INDEX_STATE` if a version is not an array of entries.
pub fn current_members(versions: &[Asset], key_column: &str) -> ContractResult<Vec<Value>> {
    let mut membership: BTreeMap<String, (Value, bool)> = BTreeMap::new();

    for version in versions {
        let entries = version.data().as_array().ok_or_else(|| {
            illegal_state(version, "index version is not an array")
        })?;
        for document in entries {
            let entry = IndexEntry::from_value(document, key_column)
                .map_err(|_| illegal_state(version, "malformed index entry"))?;
            let Some(text) = key_text(&entry.key) else {
                return Err(illegal_state(version, "index entry key has no key text"));
            };
            membership.insert(text, (entry.key, !entry.deleted));
        }
    }

    Ok(membership
        .into_values()
        .filter_map(|(key, member)| member.then_some(key))
        .collect())
}

fn illegal_state(version: &Asset, reason: &str) -> ContractError {
    tracing::warn!(asset_id = version.id(), age = version.age(), reason, "illegal index state");
    ContractError::new(ErrorCode::IllegalIndexState)
}
