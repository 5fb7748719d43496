//! Insert: add a new record and its index entries.

use super::{load_table, names, Contract, SubContractInvoker};
use crate::args;
use crate::asset_id::{index_asset_id, record_asset_id};
use crate::error::{ContractError, ContractResult, ErrorCode};
use crate::index::{IndexDeltas, IndexEntry};
use tabledger_codec::Value;
use tabledger_ledger::Ledger;

const TABLE: &str = "table";
const VALUES: &str = "values";

/// Inserts a record that does not exist yet.
///
/// Argument: `{table, values}`. Writes the record at age 0 plus one entry
/// to the bucket of every indexed column present in `values`, so the
/// invocation writes `1 + present indexed columns` assets. Returns nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Insert;

impl Contract for Insert {
    fn name(&self) -> &str {
        names::INSERT
    }

    fn invoke(
        &self,
        ledger: &mut dyn Ledger,
        argument: &Value,
        _invoker: &dyn SubContractInvoker,
    ) -> ContractResult<Option<Value>> {
        let code = ErrorCode::InvalidRecordFormat;
        let map = args::fields(argument, &[TABLE, VALUES], &[], code)?;
        let table_name = args::text(map, TABLE, code)?;
        let values = map.get(VALUES).filter(|v| v.as_map().is_some()).ok_or(ContractError::new(code))?;

        let table = load_table(ledger, table_name)?;

        let key = values
            .get(&table.key)
            .ok_or(ContractError::new(ErrorCode::RecordKeyNotExist))?;
        if !table.key_type.matches(key) {
            return Err(ContractError::new(ErrorCode::InvalidKeyType));
        }

        let record_id = record_asset_id(&table.table, &table.key, key);
        if ledger.get(&record_id)?.is_some() {
            return Err(ContractError::new(ErrorCode::RecordAlreadyExists));
        }

        let mut deltas = IndexDeltas::new(&table.key);
        for index in &table.indexes {
            let Some(value) = values.get(&index.key) else {
                continue;
            };
            if !index.accepts(value) {
                return Err(ContractError::new(ErrorCode::InvalidIndexKeyType));
            }
            deltas.push(
                index_asset_id(&table.table, &index.key, value),
                &IndexEntry::added(key.clone(), 0),
            );
        }

        let index_writes = deltas.len();
        deltas.write(ledger)?;
        ledger.put(&record_id, values.clone())?;

        tracing::debug!(table = %table.table, asset_id = %record_id, index_writes, "inserted record");
        Ok(None)
    }
}
