//! Contract registry.

use super::{
    Contract, Create, GetHistory, Insert, Scan, Select, ShowTables, SubContractInvoker, Update,
};
use crate::config::Config;
use crate::error::{ContractError, ContractResult};
use std::collections::BTreeMap;
use tabledger_codec::Value;
use tabledger_ledger::{Executed, InMemoryLedger, Ledger};

/// Contracts by id, and the invoker that lets them call each other.
///
/// Ids are `<namespace>.<Name>`, the namespace coming from [`Config`].
///
/// # Example
///
/// ```rust
/// use tabledger_codec::Value;
/// use tabledger_core::{Config, ContractRegistry};
/// use tabledger_ledger::InMemoryLedger;
///
/// let registry = ContractRegistry::with_table_contracts(Config::default());
/// let ledger = InMemoryLedger::new();
///
/// let create = Value::map([
///     ("table", Value::from("users")),
///     ("key", Value::from("id")),
///     ("key_type", Value::from("number")),
/// ]);
/// registry.execute(&ledger, "table.v1_0_0.Create", &create).unwrap();
///
/// let shown = registry
///     .execute(&ledger, "table.v1_0_0.ShowTables", &Value::Null)
///     .unwrap();
/// assert_eq!(shown.output.unwrap().as_array().unwrap().len(), 1);
/// ```
pub struct ContractRegistry {
    config: Config,
    contracts: BTreeMap<String, Box<dyn Contract>>,
}

impl ContractRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            contracts: BTreeMap::new(),
        }
    }

    /// Creates a registry holding the seven table contracts.
    #[must_use]
    pub fn with_table_contracts(config: Config) -> Self {
        let mut registry = Self::new(config);
        let select = Select::new(&registry.config);
        let update = Update::new(&registry.config);
        registry.register(Box::new(Create));
        registry.register(Box::new(Insert));
        registry.register(Box::new(Scan));
        registry.register(Box::new(select));
        registry.register(Box::new(update));
        registry.register(Box::new(GetHistory));
        registry.register(Box::new(ShowTables));
        registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a contract under `<namespace>.<name>` and returns the id.
    ///
    /// A contract already registered under the id is replaced.
    pub fn register(&mut self, contract: Box<dyn Contract>) -> String {
        let contract_id = self.config.contract_id(contract.name());
        self.contracts.insert(contract_id.clone(), contract);
        contract_id
    }

    /// Returns the id of the contract called `name`.
    #[must_use]
    pub fn contract_id(&self, name: &str) -> String {
        self.config.contract_id(name)
    }

    /// Returns true if a contract is registered under `contract_id`.
    #[must_use]
    pub fn contains(&self, contract_id: &str) -> bool {
        self.contracts.contains_key(contract_id)
    }

    /// Returns the registered ids in order.
    pub fn contract_ids(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    /// Runs a contract as one ledger transaction.
    ///
    /// Every write of the invocation, sub-contracts included, commits
    /// atomically, or none does.
    ///
    /// # Errors
    ///
    /// Returns the contract's error, or a ledger error if the commit fails.
    pub fn execute(
        &self,
        ledger: &InMemoryLedger,
        contract_id: &str,
        argument: &Value,
    ) -> ContractResult<Executed<Option<Value>>> {
        ledger.execute(|txn| self.invoke(contract_id, txn, argument))
    }

    /// Runs the contract called `name` in this registry's namespace.
    ///
    /// # Errors
    ///
    /// See [`ContractRegistry::execute`].
    pub fn execute_named(
        &self,
        ledger: &InMemoryLedger,
        name: &str,
        argument: &Value,
    ) -> ContractResult<Executed<Option<Value>>> {
        self.execute(ledger, &self.contract_id(name), argument)
    }
}

impl SubContractInvoker for ContractRegistry {
    fn invoke(
        &self,
        contract_id: &str,
        ledger: &mut dyn Ledger,
        argument: &Value,
    ) -> ContractResult<Option<Value>> {
        let contract = self
            .contracts
            .get(contract_id)
            .ok_or_else(|| ContractError::contract_not_found(contract_id))?;
        tracing::trace!(contract_id, "invoke contract");
        contract.invoke(ledger, argument, self).map_err(|e| {
            tracing::debug!(contract_id, error = %e, "contract failed");
            e
        })
    }
}

impl std::fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("config", &self.config)
            .field("contracts", &self.contracts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ContractRegistry {
    fn default() -> Self {
        Self::with_table_contracts(Config::default())
    }
}
