//! Argument shape checks shared by the contracts.

use crate::error::{ContractError, ContractResult, ErrorCode};
use std::collections::BTreeMap;
use tabledger_codec::Value;

/// Returns the fields of `argument` if it is a map holding every `required`
/// key and no key outside `required` and `optional`.
pub(crate) fn fields<'a>(
    argument: &'a Value,
    required: &[&str],
    optional: &[&str],
    code: ErrorCode,
) -> ContractResult<&'a BTreeMap<String, Value>> {
    let map = argument.as_map().ok_or(ContractError::new(code))?;
    let has_required = required.iter().all(|key| map.contains_key(*key));
    let all_known = map
        .keys()
        .all(|key| required.contains(&key.as_str()) || optional.contains(&key.as_str()));
    if has_required && all_known {
        Ok(map)
    } else {
        Err(ContractError::new(code))
    }
}

/// Returns a text field, failing with `code` if it is missing or not text.
pub(crate) fn text<'a>(
    fields: &'a BTreeMap<String, Value>,
    key: &str,
    code: ErrorCode,
) -> ContractResult<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_text)
        .ok_or(ContractError::new(code))
}

/// Returns an optional text field, failing with `code` if it is not text.
pub(crate) fn optional_text<'a>(
    fields: &'a BTreeMap<String, Value>,
    key: &str,
    code: ErrorCode,
) -> ContractResult<Option<&'a str>> {
    match fields.get(key) {
        None => Ok(None),
        Some(value) => value.as_text().map(Some).ok_or(ContractError::new(code)),
    }
}
