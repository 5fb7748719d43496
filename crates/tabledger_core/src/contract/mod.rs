//! The table contracts.
//!
//! A contract is a deterministic function of its argument and the ledger
//! snapshot it runs against. Contracts that build on another contract
//! (Select and Update both run Scan) call it through a
//! [`SubContractInvoker`] rather than directly, so the composition is
//! explicit and each side can be tested alone.

mod create;
mod history;
mod insert;
mod registry;
mod scan;
mod select;
mod show_tables;
mod update;

pub use create::Create;
pub use history::GetHistory;
pub use insert::Insert;
pub use registry::ContractRegistry;
pub use scan::Scan;
pub use select::Select;
pub use show_tables::ShowTables;
pub use update::Update;

use crate::asset_id::table_asset_id;
use crate::error::{ContractError, ContractResult, ErrorCode};
use crate::schema::TableDefinition;
use tabledger_codec::{CodecError, Value};
use tabledger_ledger::Ledger;

/// Names the table contracts are registered under.
pub mod names {
    /// [`super::Create`]
    pub const CREATE: &str = "Create";
    /// [`super::Insert`]
    pub const INSERT: &str = "Insert";
    /// [`super::Scan`]
    pub const SCAN: &str = "Scan";
    /// [`super::Select`]
    pub const SELECT: &str = "Select";
    /// [`super::Update`]
    pub const UPDATE: &str = "Update";
    /// [`super::GetHistory`]
    pub const GET_HISTORY: &str = "GetHistory";
    /// [`super::ShowTables`]
    pub const SHOW_TABLES: &str = "ShowTables";
}

/// Field added to scan results when metadata is requested.
pub const METADATA_AGE: &str = "age";

/// A deterministic contract over the ledger.
pub trait Contract: Send + Sync {
    /// Returns the name the contract is registered under.
    fn name(&self) -> &str;

    /// Runs the contract.
    ///
    /// Every read goes through `ledger`; every write is buffered by it and
    /// discarded if this returns an error.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractError`] if the argument or the ledger state is
    /// rejected, or if the ledger fails.
    fn invoke(
        &self,
        ledger: &mut dyn Ledger,
        argument: &Value,
        invoker: &dyn SubContractInvoker,
    ) -> ContractResult<Option<Value>>;
}

/// Runs another contract within the same invocation.
pub trait SubContractInvoker {
    /// Runs the contract registered under `contract_id` against `ledger`.
    ///
    /// # Errors
    ///
    /// Returns the sub-contract's error, or
    /// [`ContractError::ContractNotFound`].
    fn invoke(
        &self,
        contract_id: &str,
        ledger: &mut dyn Ledger,
        argument: &Value,
    ) -> ContractResult<Option<Value>>;
}

/// Reads the definition of `table`, failing with `TABLE_NOT_EXIST`.
pub(crate) fn load_table(ledger: &mut dyn Ledger, table: &str) -> ContractResult<TableDefinition> {
    let asset = ledger
        .get(&table_asset_id(table))?
        .ok_or(ContractError::new(ErrorCode::TableNotExist))?;
    TableDefinition::from_value(asset.data())
}

/// Unwraps the array a sub-contract returned.
pub(crate) fn into_array(result: Option<Value>, contract_id: &str) -> ContractResult<Vec<Value>> {
    match result {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(CodecError::invalid_structure(format!("{contract_id} did not return an array")).into()),
    }
}
