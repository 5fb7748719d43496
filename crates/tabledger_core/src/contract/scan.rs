//! Scan: the query executor.

use super::{load_table, names, Contract, SubContractInvoker, METADATA_AGE};
use crate::args;
use crate::asset_id::record_asset_id;
use crate::error::{ContractError, ContractResult, ErrorCode};
use crate::index::current_members;
use crate::query::{select_access_path, AccessPath, Condition};
use crate::schema::TableDefinition;
use tabledger_codec::Value;
use tabledger_ledger::{Asset, AssetFilter, Ledger};

pub(crate) const TABLE: &str = "table";
pub(crate) const CONDITIONS: &str = "conditions";
pub(crate) const PROJECTIONS: &str = "projections";
pub(crate) const OPTIONS: &str = "options";
pub(crate) const INCLUDE_METADATA: &str = "include_metadata";

/// A parsed Scan or Select argument.
#[derive(Debug)]
pub(crate) struct Query<'a> {
    pub(crate) table: &'a str,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) include_metadata: bool,
}

impl<'a> Query<'a> {
    /// Parses `{table, conditions, projections?, options?}`.
    ///
    /// Projections are accepted but not interpreted here.
    pub(crate) fn parse(argument: &'a Value) -> ContractResult<Self> {
        let code = ErrorCode::InvalidQueryFormat;
        let map = args::fields(argument, &[TABLE, CONDITIONS], &[PROJECTIONS, OPTIONS], code)?;
        let table = args::text(map, TABLE, code)?;

        let conditions = map.get(CONDITIONS).filter(|c| c.as_array().is_some()).ok_or(ContractError::new(code))?;
        let conditions = Condition::parse_all(conditions)?;

        let include_metadata = match map.get(OPTIONS) {
            None => false,
            Some(options) => {
                let options = args::fields(options, &[], &[INCLUDE_METADATA], code)?;
                match options.get(INCLUDE_METADATA) {
                    None => false,
                    Some(flag) => flag.as_bool().ok_or(ContractError::new(code))?,
                }
            }
        };

        Ok(Self {
            table,
            conditions,
            include_metadata,
        })
    }
}

/// Finds the records of a table that satisfy every condition.
///
/// Argument: `{table, conditions, projections?, options?: {include_metadata}}`.
/// Returns an array of record documents; with `include_metadata` each
/// carries the record's current `age`.
///
/// Exactly one condition chooses how candidates are located (see
/// [`crate::query`]); all conditions, that one included, are then
/// re-evaluated against every candidate. Index lookups return records in
/// primary-key order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scan;

impl Contract for Scan {
    fn name(&self) -> &str {
        names::SCAN
    }

    fn invoke(
        &self,
        ledger: &mut dyn Ledger,
        argument: &Value,
        _invoker: &dyn SubContractInvoker,
    ) -> ContractResult<Option<Value>> {
        let query = Query::parse(argument)?;
        let table = load_table(ledger, query.table)?;
        let path = select_access_path(&table, &query.conditions)?;

        let candidates: Vec<Asset> = match &path {
            AccessPath::Record { asset_id } => ledger.get(asset_id)?.into_iter().collect(),
            AccessPath::Index { asset_id } => index_candidates(ledger, &table, asset_id)?,
        };
        let candidate_count = candidates.len();

        let results: Vec<Value> = candidates
            .into_iter()
            .filter(|asset| query.conditions.iter().all(|c| c.matches(asset.data())))
            .map(|asset| shape(asset, query.include_metadata))
            .collect();

        tracing::debug!(
            table = %table.table,
            access_path = %path,
            candidates = candidate_count,
            matched = results.len(),
            "scan"
        );
        Ok(Some(Value::Array(results)))
    }
}

fn index_candidates(
    ledger: &mut dyn Ledger,
    table: &TableDefinition,
    index_id: &str,
) -> ContractResult<Vec<Asset>> {
    let versions = ledger.scan(&AssetFilter::new(index_id))?;
    let members = current_members(&versions, &table.key)?;

    let mut records = Vec::with_capacity(members.len());
    for key in members {
        let record_id = record_asset_id(&table.table, &table.key, &key);
        match ledger.get(&record_id)? {
            Some(record) => records.push(record),
            None => {
                tracing::warn!(
                    index = index_id,
                    asset_id = %record_id,
                    "index member has no record"
                );
                return Err(ContractError::new(ErrorCode::IllegalIndexState));
            }
        }
    }
    Ok(records)
}

fn shape(asset: Asset, include_metadata: bool) -> Value {
    let age = asset.age();
    let mut document = asset.into_data();
    if include_metadata {
        if let Value::Map(fields) = &mut document {
            fields.insert(METADATA_AGE.to_string(), Value::from(age));
        }
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::testing::{condition, create_tbl, insert, run, seed, NoSubContracts};
    use crate::index::IndexEntry;
    use tabledger_ledger::InMemoryLedger;

    fn scan_with(ledger: &InMemoryLedger, conditions: Vec<Value>, options: Option<Value>) -> ContractResult<Vec<Value>> {
        let mut fields = vec![
            ("table", Value::from("tbl")),
            ("conditions", Value::Array(conditions)),
        ];
        if let Some(options) = options {
            fields.push(("options", options));
        }
        let result = run(ledger, &Scan, Value::map(fields), &NoSubContracts)?;
        match result {
            Some(Value::Array(items)) => Ok(items),
            other => panic!("unexpected scan result {other:?}"),
        }
    }

    fn scan(ledger: &InMemoryLedger, conditions: Vec<Value>) -> ContractResult<Vec<Value>> {
        scan_with(ledger, conditions, None)
    }

    fn record(key: &str, idx: Value, col: &str) -> Value {
        Value::map([
            ("pkey", Value::from(key)),
            ("some_idx", idx),
            ("col", Value::from(col)),
        ])
    }

    fn populated() -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        create_tbl(&ledger);
        insert(&ledger, record("k2", Value::Integer(1), "b"));
        insert(&ledger, record("k1", Value::Integer(1), "a"));
        insert(&ledger, record("k3", Value::Integer(2), "c"));
        insert(&ledger, record("k4", Value::Null, "d"));
        ledger
    }

    #[test]
    fn primary_key_lookup() {
        let ledger = populated();
        let found = scan(&ledger, vec![condition("pkey", "=", Some(Value::from("k1")))]).unwrap();
        assert_eq!(found, vec![record("k1", Value::Integer(1), "a")]);

        let missing = scan(&ledger, vec![condition("pkey", "=", Some(Value::from("zz")))]).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn index_lookup_orders_by_primary_key() {
        let ledger = populated();
        let found = scan(&ledger, vec![condition("some_idx", "=", Some(Value::Double(1.0)))]).unwrap();
        assert_eq!(
            found,
            vec![
                record("k1", Value::Integer(1), "a"),
                record("k2", Value::Integer(1), "b"),
            ]
        );
    }

    #[test]
    fn null_index_lookup() {
        let ledger = populated();
        let found = scan(&ledger, vec![condition("some_idx", "is_null", None)]).unwrap();
        assert_eq!(found, vec![record("k4", Value::Null, "d")]);
    }

    #[test]
    fn every_condition_filters() {
        let ledger = populated();
        let found = scan(
            &ledger,
            vec![
                condition("col", "!=", Some(Value::from("a"))),
                condition("some_idx", "=", Some(Value::Integer(1))),
            ],
        )
        .unwrap();
        assert_eq!(found, vec![record("k2", Value::Integer(1), "b")]);

        let none = scan(
            &ledger,
            vec![
                condition("pkey", "=", Some(Value::from("k1"))),
                condition("col", "=", Some(Value::Integer(1))),
            ],
        )
        .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn metadata_adds_age() {
        let ledger = populated();
        let found = scan_with(
            &ledger,
            vec![condition("pkey", "=", Some(Value::from("k3")))],
            Some(Value::map([("include_metadata", Value::Bool(true))])),
        )
        .unwrap();
        assert_eq!(found[0].get("age"), Some(&Value::Integer(0)));
    }

    #[test]
    fn no_access_path() {
        let ledger = populated();
        let err = scan(
            &ledger,
            vec![
                condition("pkey", ">", Some(Value::from("k1"))),
                condition("col", "=", Some(Value::from("a"))),
            ],
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidKeySpecification));
    }

    #[test]
    fn query_shape_errors() {
        let ledger = populated();
        let run_arg = |arg: Value| run(&ledger, &Scan, arg, &NoSubContracts).unwrap_err().code();

        let extra = Value::map([
            ("table", Value::from("tbl")),
            ("conditions", Value::Array(vec![])),
            ("order_by", Value::from("pkey")),
        ]);
        assert_eq!(run_arg(extra), Some(ErrorCode::InvalidQueryFormat));

        let not_array = Value::map([("table", Value::from("tbl")), ("conditions", Value::from("x"))]);
        assert_eq!(run_arg(not_array), Some(ErrorCode::InvalidQueryFormat));

        let bad_options = Value::map([
            ("table", Value::from("tbl")),
            ("conditions", Value::Array(vec![])),
            ("options", Value::map([("include_metadata", Value::from("yes"))])),
        ]);
        assert_eq!(run_arg(bad_options), Some(ErrorCode::InvalidQueryFormat));

        let missing_table = Value::map([("table", Value::from("nope")), ("conditions", Value::Array(vec![]))]);
        assert_eq!(run_arg(missing_table), Some(ErrorCode::TableNotExist));
    }

    #[test]
    fn condition_errors_surface() {
        let ledger = populated();
        let err = scan(&ledger, vec![condition("pkey", "~", Some(Value::from("k1")))]).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidOperator));
        let err = scan(&ledger, vec![Value::from("pkey = k1")]).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidConditionFormat));
    }

    #[test]
    fn soft_deleted_members_are_skipped() {
        let ledger = populated();
        seed(
            &ledger,
            &[(
                "index:tbl:some_idx:1",
                Value::Array(vec![
                    IndexEntry::deleted(Value::from("k1"), 1).to_value("pkey"),
                    IndexEntry::deleted(Value::from("k2"), 1).to_value("pkey"),
                ]),
            )],
        );
        let found = scan(&ledger, vec![condition("some_idx", "=", Some(Value::Integer(1)))]).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn member_without_record_is_illegal_state() {
        let ledger = populated();
        seed(
            &ledger,
            &[(
                "index:tbl:some_idx:2",
                Value::Array(vec![IndexEntry::added(Value::from("ghost"), 0).to_value("pkey")]),
            )],
        );
        let err = scan(&ledger, vec![condition("some_idx", "=", Some(Value::Integer(2)))]).unwrap_err();
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn scan_performs_no_writes() {
        let ledger = populated();
        let executed = ledger
            .execute(|txn| {
                Scan.invoke(
                    txn,
                    &Value::map([
                        ("table", Value::from("tbl")),
                        ("conditions", Value::Array(vec![condition("some_idx", "=", Some(Value::Integer(1)))])),
                    ]),
                    &NoSubContracts,
                )
            })
            .unwrap();
        assert_eq!(executed.receipt.write_count(), 0);
    }
}
