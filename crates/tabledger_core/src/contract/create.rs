//! Create: define a table.

use super::{names, Contract, SubContractInvoker};
use crate::args;
use crate::asset_id::{table_asset_id, ALL_TABLES_ASSET_ID};
use crate::error::{ContractError, ContractResult, ErrorCode};
use crate::schema::{check_name, fields, IndexDefinition, KeyType, TableDefinition};
use tabledger_codec::Value;
use tabledger_ledger::Ledger;

/// Validates a table definition and writes it once.
///
/// Argument: `{table, key, key_type, indexes?: [{key, key_type}]}`.
/// The definition is written to `table:<name>` and appended to the shared
/// all-tables asset. Returns nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Create;

impl Contract for Create {
    fn name(&self) -> &str {
        names::CREATE
    }

    fn invoke(
        &self,
        ledger: &mut dyn Ledger,
        argument: &Value,
        _invoker: &dyn SubContractInvoker,
    ) -> ContractResult<Option<Value>> {
        let definition = parse_definition(argument)?;
        let asset_id = table_asset_id(&definition.table);

        if ledger.get(&asset_id)?.is_some() {
            return Err(ContractError::new(ErrorCode::TableAlreadyExists));
        }

        let document = definition.to_value();
        ledger.put(&asset_id, document.clone())?;
        ledger.put(ALL_TABLES_ASSET_ID, document)?;

        tracing::debug!(
            table = %definition.table,
            indexes = definition.indexes.len(),
            "created table"
        );
        Ok(None)
    }
}

fn parse_definition(argument: &Value) -> ContractResult<TableDefinition> {
    let code = ErrorCode::InvalidTableFormat;
    let map = args::fields(
        argument,
        &[fields::TABLE, fields::KEY, fields::KEY_TYPE],
        &[fields::INDEXES],
        code,
    )?;
    let table = args::text(map, fields::TABLE, code)?;
    let key = args::text(map, fields::KEY, code)?;
    let key_type = args::text(map, fields::KEY_TYPE, code)?;
    let index_documents = match map.get(fields::INDEXES) {
        None => &[][..],
        Some(value) => value.as_array().ok_or(ContractError::new(code))?,
    };

    let mut indexes = Vec::with_capacity(index_documents.len());
    for document in index_documents {
        let code = ErrorCode::InvalidIndexFormat;
        let index = args::fields(document, &[fields::KEY, fields::KEY_TYPE], &[], code)?;
        let index_key = args::text(index, fields::KEY, code)?;
        if index_key == key || indexes.iter().any(|(seen, _)| *seen == index_key) {
            return Err(ContractError::with_detail(code, index_key));
        }
        indexes.push((index_key, args::text(index, fields::KEY_TYPE, code)?));
    }

    check_name(table)?;
    check_name(key)?;
    for (index_key, _) in &indexes {
        check_name(index_key)?;
    }

    let key_type: KeyType = key_type
        .parse()
        .map_err(|()| ContractError::new(ErrorCode::InvalidKeyType))?;
    let mut definition = TableDefinition::new(table, key, key_type);

    for (index_key, index_type) in indexes {
        let index_type: KeyType = index_type
            .parse()
            .map_err(|()| ContractError::new(ErrorCode::InvalidIndexKeyType))?;
        definition = definition.with_index(IndexDefinition::new(index_key, index_type));
    }

    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::testing::{create_tbl, run, NoSubContracts};
    use tabledger_ledger::InMemoryLedger;

    fn create(ledger: &InMemoryLedger, argument: Value) -> ContractResult<Option<Value>> {
        run(ledger, &Create, argument, &NoSubContracts)
    }

    fn index(key: &str, key_type: &str) -> Value {
        Value::map([("key", Value::from(key)), ("key_type", Value::from(key_type))])
    }

    fn definition(table: &str, key: &str, key_type: &str, indexes: Option<Vec<Value>>) -> Value {
        let mut fields = vec![
            ("table", Value::from(table)),
            ("key", Value::from(key)),
            ("key_type", Value::from(key_type)),
        ];
        if let Some(indexes) = indexes {
            fields.push(("indexes", Value::Array(indexes)));
        }
        Value::map(fields)
    }

    fn code_of(ledger: &InMemoryLedger, argument: Value) -> ErrorCode {
        create(ledger, argument).unwrap_err().code().unwrap()
    }

    #[test]
    fn writes_definition_to_table_and_all_tables() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);

        let mut txn = ledger.begin();
        let stored = txn.get("table:tbl").unwrap().unwrap();
        let expected = Value::map([
            ("table", Value::from("tbl")),
            ("key", Value::from("pkey")),
            ("key_type", Value::from("string")),
            ("indexes", Value::Array(vec![index("some_idx", "number")])),
        ]);
        assert_eq!(stored.data(), &expected);
        assert_eq!(txn.get(ALL_TABLES_ASSET_ID).unwrap().unwrap().data(), &expected);
    }

    #[test]
    fn indexes_default_to_empty_and_types_are_lowered() {
        let ledger = InMemoryLedger::new();
        assert_eq!(create(&ledger, definition("t", "id", "NUMBER", None)).unwrap(), None);

        let mut txn = ledger.begin();
        let stored = txn.get("table:t").unwrap().unwrap().into_data();
        assert_eq!(stored.get("indexes"), Some(&Value::Array(vec![])));
        assert_eq!(stored.get("key_type"), Some(&Value::from("number")));
    }

    #[test]
    fn duplicate_table_is_rejected_without_writes() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        let before = ledger.total_versions();
        assert_eq!(
            code_of(&ledger, definition("tbl", "other", "string", None)),
            ErrorCode::TableAlreadyExists
        );
        assert_eq!(ledger.total_versions(), before);
        assert_eq!(ledger.version_count(ALL_TABLES_ASSET_ID), 1);
    }

    #[test]
    fn table_shape_errors() {
        let ledger = InMemoryLedger::new();
        let missing_key = Value::map([("table", Value::from("t")), ("key_type", Value::from("string"))]);
        assert_eq!(code_of(&ledger, missing_key), ErrorCode::InvalidTableFormat);

        let mut extra = definition("t", "id", "string", None);
        if let Value::Map(fields) = &mut extra {
            fields.insert("unique".into(), Value::Bool(true));
        }
        assert_eq!(code_of(&ledger, extra), ErrorCode::InvalidTableFormat);

        let bad_indexes = Value::map([
            ("table", Value::from("t")),
            ("key", Value::from("id")),
            ("key_type", Value::from("string")),
            ("indexes", Value::from("some_idx")),
        ]);
        assert_eq!(code_of(&ledger, bad_indexes), ErrorCode::InvalidTableFormat);
        assert_eq!(code_of(&ledger, Value::Null), ErrorCode::InvalidTableFormat);
    }

    #[test]
    fn index_shape_errors() {
        let ledger = InMemoryLedger::new();
        let missing_type = Value::map([("key", Value::from("c"))]);
        let arg = definition("t", "id", "string", Some(vec![missing_type]));
        assert_eq!(code_of(&ledger, arg), ErrorCode::InvalidIndexFormat);

        let duplicate = definition("t", "id", "string", Some(vec![index("c", "string"), index("c", "number")]));
        assert_eq!(code_of(&ledger, duplicate), ErrorCode::InvalidIndexFormat);

        let on_key = definition("t", "id", "string", Some(vec![index("id", "string")]));
        assert_eq!(code_of(&ledger, on_key), ErrorCode::InvalidIndexFormat);
    }

    #[test]
    fn index_format_is_checked_before_names_and_types() {
        let ledger = InMemoryLedger::new();
        let bad_types = definition(
            "t",
            "id",
            "date",
            Some(vec![index("c", "date"), index("c", "date")]),
        );
        assert_eq!(code_of(&ledger, bad_types), ErrorCode::InvalidIndexFormat);

        let bad_name = definition("1t", "id", "string", Some(vec![index("id", "number")]));
        assert_eq!(code_of(&ledger, bad_name), ErrorCode::InvalidIndexFormat);
        assert_eq!(ledger.total_versions(), 0);
    }

    #[test]
    fn names_are_checked() {
        let ledger = InMemoryLedger::new();
        let err = create(&ledger, definition("1tbl", "id", "string", None)).unwrap_err();
        assert_eq!(err.to_string(), "INVALID_OBJECT_NAME: 1tbl");

        let err = create(&ledger, definition("t", "id", "string", Some(vec![index("a:b", "string")])))
            .unwrap_err();
        assert_eq!(err.to_string(), "INVALID_OBJECT_NAME: a:b");
    }

    #[test]
    fn types_are_checked() {
        let ledger = InMemoryLedger::new();
        assert_eq!(
            code_of(&ledger, definition("t", "id", "uuid", None)),
            ErrorCode::InvalidKeyType
        );
        assert_eq!(
            code_of(&ledger, definition("t", "id", "string", Some(vec![index("c", "date")]))),
            ErrorCode::InvalidIndexKeyType
        );
        assert_eq!(ledger.total_versions(), 0);
    }

    #[test]
    fn all_tables_lists_every_create() {
        let ledger = InMemoryLedger::new();
        create(&ledger, definition("a", "id", "string", None)).unwrap();
        create(&ledger, definition("b", "id", "number", None)).unwrap();
        assert_eq!(ledger.version_count(ALL_TABLES_ASSET_ID), 2);
    }
}
