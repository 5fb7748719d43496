//! GetHistory: the versions of one record.

use super::{load_table, names, Contract, SubContractInvoker, METADATA_AGE};
use crate::args;
use crate::asset_id::record_asset_id;
use crate::error::{ContractError, ContractResult, ErrorCode};
use tabledger_codec::Value;
use tabledger_ledger::{AgeOrder, AssetFilter, Ledger};

const TABLE: &str = "table";
const KEY: &str = "key";
const LIMIT: &str = "limit";
const VALUES: &str = "values";

/// Returns the versions of a record, newest first.
///
/// Argument: `{table, key, limit?}` where `limit` is a positive integer.
/// Returns an array of `{age, values}`; a record that was never written has
/// an empty history.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetHistory;

impl Contract for GetHistory {
    fn name(&self) -> &str {
        names::GET_HISTORY
    }

    fn invoke(
        &self,
        ledger: &mut dyn Ledger,
        argument: &Value,
        _invoker: &dyn SubContractInvoker,
    ) -> ContractResult<Option<Value>> {
        let code = ErrorCode::InvalidContractArguments;
        let map = args::fields(argument, &[TABLE, KEY], &[LIMIT], code)?;
        let table_name = args::text(map, TABLE, code)?;
        let key = map.get(KEY).ok_or(ContractError::new(code))?;
        let limit = match map.get(LIMIT) {
            None => None,
            Some(limit) => Some(
                limit
                    .as_integer()
                    .filter(|n| *n > 0)
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or(ContractError::new(code))?,
            ),
        };

        let table = load_table(ledger, table_name)?;
        if !table.key_type.matches(key) {
            return Err(ContractError::new(ErrorCode::InvalidKeyType));
        }

        let mut filter = AssetFilter::new(record_asset_id(&table.table, &table.key, key))
            .with_age_order(AgeOrder::Desc);
        if let Some(limit) = limit {
            filter = filter.with_limit(limit);
        }
        let versions = ledger.scan(&filter)?;

        tracing::debug!(table = %table.table, versions = versions.len(), "record history");
        Ok(Some(Value::Array(
            versions
                .into_iter()
                .map(|asset| {
                    let age = asset.age();
                    Value::map([
                        (METADATA_AGE, Value::from(age)),
                        (VALUES, asset.into_data()),
                    ])
                })
                .collect(),
        )))
    }
}
