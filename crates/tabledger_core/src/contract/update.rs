//! Update: rewrite matched records and migrate their index entries.

use super::scan::{CONDITIONS, INCLUDE_METADATA, OPTIONS, TABLE};
use super::{into_array, load_table, names, Contract, SubContractInvoker};
use crate::args;
use crate::asset_id::{index_asset_id, record_asset_id};
use crate::config::Config;
use crate::error::{ContractError, ContractResult, ErrorCode};
use crate::index::{IndexDeltas, IndexEntry};
use crate::schema::TableDefinition;
use std::collections::BTreeMap;
use tabledger_codec::Value;
use tabledger_ledger::Ledger;

const VALUES: &str = "values";

/// Sets columns on every record matching the conditions.
///
/// Argument: `{table, values, conditions}`. `values` may not contain the
/// primary-key column. Records whose merged document is unchanged are not
/// rewritten. For every indexed column whose bucket changes, the record
/// leaves the old bucket and joins the new one; both entries carry the age
/// the record reaches with this write. Returns nothing.
#[derive(Debug, Clone)]
pub struct Update {
    scan_contract_id: String,
}

impl Update {
    /// Creates an Update that finds records with the Scan registered under
    /// `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            scan_contract_id: config.contract_id(names::SCAN),
        }
    }
}

impl Default for Update {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Contract for Update {
    fn name(&self) -> &str {
        names::UPDATE
    }

    fn invoke(
        &self,
        ledger: &mut dyn Ledger,
        argument: &Value,
        invoker: &dyn SubContractInvoker,
    ) -> ContractResult<Option<Value>> {
        let code = ErrorCode::InvalidUpdateFormat;
        let map = args::fields(argument, &[TABLE, VALUES, CONDITIONS], &[], code)?;
        let table_name = args::text(map, TABLE, code)?;
        let values = map
            .get(VALUES)
            .and_then(Value::as_map)
            .filter(|values| !values.is_empty())
            .ok_or(ContractError::new(code))?;
        let conditions = map
            .get(CONDITIONS)
            .filter(|c| c.as_array().is_some())
            .ok_or(ContractError::new(code))?;

        let table = load_table(ledger, table_name)?;
        if values.contains_key(&table.key) {
            return Err(ContractError::new(ErrorCode::CannotUpdateKey));
        }
        for (column, value) in values {
            if table.index(column).is_some_and(|index| !index.accepts(value)) {
                return Err(ContractError::new(ErrorCode::InvalidIndexKeyType));
            }
        }

        let scan_argument = Value::map([
            (TABLE, Value::from(table_name)),
            (CONDITIONS, conditions.clone()),
            (OPTIONS, Value::map([(INCLUDE_METADATA, Value::Bool(true))])),
        ]);
        let matched = into_array(
            invoker.invoke(&self.scan_contract_id, ledger, &scan_argument)?,
            &self.scan_contract_id,
        )?;

        let mut deltas = IndexDeltas::new(&table.key);
        let mut rewritten = 0usize;
        for found in &matched {
            if rewrite(ledger, &table, found, values, &mut deltas)? {
                rewritten += 1;
            }
        }
        let index_writes = deltas.len();
        deltas.write(ledger)?;

        tracing::debug!(
            table = %table.table,
            matched = matched.len(),
            rewritten,
            index_writes,
            "updated records"
        );
        Ok(None)
    }
}

/// Rewrites one matched record; returns false if nothing changed.
fn rewrite(
    ledger: &mut dyn Ledger,
    table: &TableDefinition,
    found: &Value,
    values: &BTreeMap<String, Value>,
    deltas: &mut IndexDeltas,
) -> ContractResult<bool> {
    let illegal = || ContractError::new(ErrorCode::IllegalIndexState);

    // The stored version, not the annotated scan result, is the base of the
    // merge, so a record column named like the metadata field is kept.
    let key = found.get(&table.key).ok_or_else(illegal)?.clone();
    let record_id = record_asset_id(&table.table, &table.key, &key);
    let current = ledger.get(&record_id)?.ok_or_else(illegal)?;
    let original = current.data().as_map().ok_or_else(illegal)?;

    let mut merged = original.clone();
    merged.extend(values.iter().map(|(column, value)| (column.clone(), value.clone())));
    if &merged == original {
        return Ok(false);
    }

    let next_age = current.age() + 1;
    for index in &table.indexes {
        let Some(new_value) = values.get(&index.key) else {
            continue;
        };
        let new_bucket = index_asset_id(&table.table, &index.key, new_value);
        if let Some(old_value) = original.get(&index.key) {
            let old_bucket = index_asset_id(&table.table, &index.key, old_value);
            if old_bucket == new_bucket {
                continue;
            }
            deltas.push(old_bucket, &IndexEntry::deleted(key.clone(), next_age));
        }
        deltas.push(new_bucket, &IndexEntry::added(key.clone(), next_age));
    }

    ledger.put(&record_id, Value::Map(merged))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::testing::{condition, create_tbl, insert, run, CannedInvoker};
    use tabledger_ledger::{AssetFilter, InMemoryLedger};

    fn record(key: &str, idx: Value, col: &str) -> Value {
        Value::map([
            ("pkey", Value::from(key)),
            ("some_idx", idx),
            ("col", Value::from(col)),
        ])
    }

    fn with_age(record: &Value, age: i64) -> Value {
        let mut fields = record.as_map().unwrap().clone();
        fields.insert("age".into(), Value::Integer(age));
        Value::Map(fields)
    }

    fn update_argument(values: Value) -> Value {
        Value::map([
            ("table", Value::from("tbl")),
            ("values", values),
            (
                "conditions",
                Value::Array(vec![condition("some_idx", "=", Some(Value::Integer(1)))]),
            ),
        ])
    }

    fn bucket(ledger: &InMemoryLedger, asset_id: &str) -> Vec<Value> {
        let mut txn = ledger.begin();
        txn.scan(&AssetFilter::new(asset_id))
            .unwrap()
            .into_iter()
            .map(|asset| asset.into_data())
            .collect()
    }

    #[test]
    fn requests_scan_with_metadata() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        let invoker = CannedInvoker::new(Value::Array(vec![]));
        run(&ledger, &Update::default(), update_argument(Value::map([("col", Value::from("b"))])), &invoker)
            .unwrap();

        let calls = invoker.calls.borrow();
        assert_eq!(calls[0].0, "table.v1_0_0.Scan");
        assert_eq!(
            calls[0].1.get("options"),
            Some(&Value::map([("include_metadata", Value::Bool(true))]))
        );
        assert_eq!(
            calls[0].1.get("conditions"),
            update_argument(Value::Null).get("conditions")
        );
    }

    #[test]
    fn migrates_index_membership() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        let original = record("k1", Value::Integer(1), "a");
        insert(&ledger, original.clone());

        let invoker = CannedInvoker::new(Value::Array(vec![with_age(&original, 0)]));
        let values = Value::map([("some_idx", Value::Integer(10)), ("col", Value::from("b"))]);
        run(&ledger, &Update::default(), update_argument(values), &invoker).unwrap();

        let mut txn = ledger.begin();
        let stored = txn.get("record:tbl:pkey:k1").unwrap().unwrap();
        assert_eq!(stored.age(), 1);
        assert_eq!(stored.data(), &record("k1", Value::Integer(10), "b"));

        let old = bucket(&ledger, "index:tbl:some_idx:1");
        assert_eq!(
            old[1],
            Value::Array(vec![IndexEntry::deleted(Value::from("k1"), 1).to_value("pkey")])
        );
        let new = bucket(&ledger, "index:tbl:some_idx:10");
        assert_eq!(
            new,
            vec![Value::Array(vec![IndexEntry::added(Value::from("k1"), 1).to_value("pkey")])]
        );
    }

    #[test]
    fn unchanged_record_is_not_written() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        let original = record("k1", Value::Integer(1), "a");
        insert(&ledger, original.clone());

        let invoker = CannedInvoker::new(Value::Array(vec![with_age(&original, 0)]));
        let values = Value::map([("some_idx", Value::Integer(1)), ("col", Value::from("a"))]);
        let executed = ledger
            .execute(|txn| Update::default().invoke(txn, &update_argument(values.clone()), &invoker))
            .unwrap();
        assert_eq!(executed.receipt.write_count(), 0);
    }

    #[test]
    fn non_index_change_writes_only_record() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        let original = record("k1", Value::Integer(1), "a");
        insert(&ledger, original.clone());

        let invoker = CannedInvoker::new(Value::Array(vec![with_age(&original, 0)]));
        let values = Value::map([("some_idx", Value::Double(1.0)), ("col", Value::from("z"))]);
        let executed = ledger
            .execute(|txn| Update::default().invoke(txn, &update_argument(values.clone()), &invoker))
            .unwrap();
        assert_eq!(
            executed.receipt.writes,
            vec![("record:tbl:pkey:k1".to_string(), 1)]
        );
    }

    #[test]
    fn records_sharing_a_bucket_keep_every_entry() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        let first = record("k1", Value::Integer(1), "a");
        let second = record("k2", Value::Integer(1), "b");
        insert(&ledger, first.clone());
        insert(&ledger, second.clone());

        let invoker = CannedInvoker::new(Value::Array(vec![with_age(&first, 0), with_age(&second, 0)]));
        run(
            &ledger,
            &Update::default(),
            update_argument(Value::map([("some_idx", Value::Integer(5))])),
            &invoker,
        )
        .unwrap();

        let old = bucket(&ledger, "index:tbl:some_idx:1");
        assert_eq!(old.last().unwrap().as_array().unwrap().len(), 2);
        let new = bucket(&ledger, "index:tbl:some_idx:5");
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].as_array().unwrap().len(), 2);
    }

    #[test]
    fn validation_errors() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        let invoker = CannedInvoker::new(Value::Array(vec![]));
        let code_of = |argument: Value| {
            run(&ledger, &Update::default(), argument, &invoker)
                .unwrap_err()
                .code()
                .unwrap()
        };

        assert_eq!(
            code_of(update_argument(Value::map([("pkey", Value::from("k9"))]))),
            ErrorCode::CannotUpdateKey
        );
        assert_eq!(
            code_of(update_argument(Value::map([("some_idx", Value::from("1"))]))),
            ErrorCode::InvalidIndexKeyType
        );
        assert_eq!(
            code_of(update_argument(Value::map::<&str, _>(Vec::new()))),
            ErrorCode::InvalidUpdateFormat
        );
        assert_eq!(
            code_of(Value::map([("table", Value::from("tbl")), ("values", Value::map([("c", Value::Null)]))])),
            ErrorCode::InvalidUpdateFormat
        );

        let mut missing_table = update_argument(Value::map([("col", Value::from("b"))]));
        if let Value::Map(fields) = &mut missing_table {
            fields.insert("table".into(), Value::from("nope"));
        }
        assert_eq!(code_of(missing_table), ErrorCode::TableNotExist);
        assert!(invoker.calls.borrow().is_empty());
    }

    #[test]
    fn matched_record_missing_from_ledger_is_illegal_state() {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        let ghost = record("ghost", Value::Integer(1), "a");
        let invoker = CannedInvoker::new(Value::Array(vec![with_age(&ghost, 0)]));
        let err = run(
            &ledger,
            &Update::default(),
            update_argument(Value::map([("col", Value::from("b"))])),
            &invoker,
        )
        .unwrap_err();
        assert!(err.is_integrity_violation());
    }
}
