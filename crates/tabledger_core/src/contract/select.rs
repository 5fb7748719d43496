//! Select: Scan plus projection.

use super::scan::{INCLUDE_METADATA, OPTIONS, PROJECTIONS};
use super::{into_array, names, Contract, SubContractInvoker, METADATA_AGE};
use crate::config::Config;
use crate::error::{ContractError, ContractResult, ErrorCode};
use std::collections::BTreeSet;
use tabledger_codec::Value;
use tabledger_ledger::Ledger;

/// Runs Scan and narrows each result to the projected columns.
///
/// Argument: the Scan argument. `projections`, if given and non-empty, is
/// an array of column names; projected names a record lacks are dropped
/// silently. The `age` metadata field survives projection when requested.
#[derive(Debug, Clone)]
pub struct Select {
    scan_contract_id: String,
}

impl Select {
    /// Creates a Select that runs the Scan registered under `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            scan_contract_id: config.contract_id(names::SCAN),
        }
    }
}

impl Default for Select {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Contract for Select {
    fn name(&self) -> &str {
        names::SELECT
    }

    fn invoke(
        &self,
        ledger: &mut dyn Ledger,
        argument: &Value,
        invoker: &dyn SubContractInvoker,
    ) -> ContractResult<Option<Value>> {
        let projections = parse_projections(argument)?;
        let results = into_array(
            invoker.invoke(&self.scan_contract_id, ledger, argument)?,
            &self.scan_contract_id,
        )?;

        let Some(mut columns) = projections else {
            return Ok(Some(Value::Array(results)));
        };
        if include_metadata(argument) {
            columns.insert(METADATA_AGE);
        }

        let projected = results
            .into_iter()
            .map(|record| match record {
                Value::Map(fields) => Value::Map(
                    fields
                        .into_iter()
                        .filter(|(column, _)| columns.contains(column.as_str()))
                        .collect(),
                ),
                other => other,
            })
            .collect();
        Ok(Some(Value::Array(projected)))
    }
}

// `None` when no narrowing is requested.
fn parse_projections(argument: &Value) -> ContractResult<Option<BTreeSet<&str>>> {
    let Some(projections) = argument.get(PROJECTIONS) else {
        return Ok(None);
    };
    let columns = projections
        .as_array()
        .ok_or(ContractError::new(ErrorCode::InvalidProjectionFormat))?
        .iter()
        .map(|column| {
            column
                .as_text()
                .ok_or(ContractError::new(ErrorCode::InvalidProjectionFormat))
        })
        .collect::<ContractResult<BTreeSet<_>>>()?;
    Ok((!columns.is_empty()).then_some(columns))
}

fn include_metadata(argument: &Value) -> bool {
    argument
        .get(OPTIONS)
        .and_then(|options| options.get(INCLUDE_METADATA))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
