//! ShowTables: list table definitions.

use super::{names, Contract, SubContractInvoker};
use crate::args;
use crate::asset_id::{table_asset_id, ALL_TABLES_ASSET_ID};
use crate::error::{ContractError, ContractResult, ErrorCode};
use std::collections::BTreeMap;
use tabledger_codec::Value;
use tabledger_ledger::{AssetFilter, Ledger};

const TABLE: &str = "table";

/// Returns table definitions.
///
/// Argument: `{table?}` (or null). With a name, returns that one definition;
/// without, returns every definition in creation order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShowTables;

impl Contract for ShowTables {
    fn name(&self) -> &str {
        names::SHOW_TABLES
    }

    fn invoke(
        &self,
        ledger: &mut dyn Ledger,
        argument: &Value,
        _invoker: &dyn SubContractInvoker,
    ) -> ContractResult<Option<Value>> {
        let code = ErrorCode::InvalidContractArguments;
        let empty = Value::Map(BTreeMap::new());
        let argument = if argument.is_null() { &empty } else { argument };
        let map = args::fields(argument, &[], &[TABLE], code)?;

        let definitions = match args::optional_text(map, TABLE, code)? {
            Some(table) => {
                let asset = ledger
                    .get(&table_asset_id(table))?
                    .ok_or(ContractError::new(ErrorCode::TableNotExist))?;
                vec![asset.into_data()]
            }
            None => ledger
                .scan(&AssetFilter::new(ALL_TABLES_ASSET_ID))?
                .into_iter()
                .map(|asset| asset.into_data())
                .collect(),
        };

        tracing::debug!(tables = definitions.len(), "show tables");
        Ok(Some(Value::Array(definitions)))
    }
}
