//! Test fixtures and ledger helpers.
//!
//! Provides a harness that runs table contracts against an in-memory
//! ledger, taking and returning JSON documents.

use tabledger_codec::Value;
use tabledger_core::{names, Config, ContractRegistry, ContractResult};
use tabledger_ledger::{CommitReceipt, InMemoryLedger, LedgerConfig};
use tracing_subscriber::EnvFilter;

/// Routes contract and ledger events to the test output.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Converts a JSON document into a contract argument.
///
/// # Panics
///
/// Panics if the document holds a number that has no `Value` form.
pub fn arg(json: serde_json::Value) -> Value {
    Value::from_json(&json).expect("Failed to convert JSON argument")
}

/// Converts a contract result into JSON; `None` becomes JSON null.
///
/// # Panics
///
/// Panics if the result holds a non-finite double.
pub fn to_json(value: Option<Value>) -> serde_json::Value {
    value.map_or(serde_json::Value::Null, |v| {
        v.to_json().expect("Failed to convert result to JSON")
    })
}

/// An in-memory ledger with the table contracts registered.
#[derive(Debug)]
pub struct TableHarness {
    /// The ledger the contracts run against.
    pub ledger: InMemoryLedger,
    /// The registered contracts.
    pub registry: ContractRegistry,
}

impl TableHarness {
    /// Creates a harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default(), LedgerConfig::default())
    }

    /// Creates a harness with custom configuration.
    pub fn with_config(config: Config, ledger_config: LedgerConfig) -> Self {
        Self {
            ledger: InMemoryLedger::with_config(ledger_config),
            registry: ContractRegistry::with_table_contracts(config),
        }
    }

    /// Runs the contract called `name` and returns its result and receipt.
    pub fn invoke(
        &self,
        name: &str,
        argument: serde_json::Value,
    ) -> ContractResult<(serde_json::Value, CommitReceipt)> {
        let executed = self
            .registry
            .execute_named(&self.ledger, name, &arg(argument))?;
        Ok((to_json(executed.output), executed.receipt))
    }

    fn call(&self, name: &str, argument: serde_json::Value) -> ContractResult<serde_json::Value> {
        self.invoke(name, argument).map(|(result, _)| result)
    }

    /// Runs Create.
    pub fn create(&self, argument: serde_json::Value) -> ContractResult<serde_json::Value> {
        self.call(names::CREATE, argument)
    }

    /// Runs Insert.
    pub fn insert(&self, argument: serde_json::Value) -> ContractResult<serde_json::Value> {
        self.call(names::INSERT, argument)
    }

    /// Runs Update.
    pub fn update(&self, argument: serde_json::Value) -> ContractResult<serde_json::Value> {
        self.call(names::UPDATE, argument)
    }

    /// Runs Scan.
    pub fn scan(&self, argument: serde_json::Value) -> ContractResult<serde_json::Value> {
        self.call(names::SCAN, argument)
    }

    /// Runs Select.
    pub fn select(&self, argument: serde_json::Value) -> ContractResult<serde_json::Value> {
        self.call(names::SELECT, argument)
    }

    /// Runs GetHistory.
    pub fn history(&self, argument: serde_json::Value) -> ContractResult<serde_json::Value> {
        self.call(names::GET_HISTORY, argument)
    }

    /// Runs ShowTables.
    pub fn show_tables(&self, argument: serde_json::Value) -> ContractResult<serde_json::Value> {
        self.call(names::SHOW_TABLES, argument)
    }

    /// Writes a raw document, bypassing the contracts.
    ///
    /// Used to stage ledger states the contracts would never produce.
    pub fn seed(&self, asset_id: &str, document: serde_json::Value) {
        let document = arg(document);
        self.ledger
            .execute(|txn| {
                tabledger_ledger::Ledger::put(txn, asset_id, document.clone())
            })
            .expect("Failed to seed asset");
    }
}

impl Default for TableHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the Create argument of the sample table: `tbl`, keyed by the
/// string column `pkey`, with a number index on `some_idx`.
pub fn example_table() -> serde_json::Value {
    serde_json::json!({
        "table": "tbl",
        "key": "pkey",
        "key_type": "string",
        "indexes": [{"key": "some_idx", "key_type": "number"}],
    })
}

/// Builds a `{column, operator, value}` condition.
pub fn condition(column: &str, operator: &str, value: serde_json::Value) -> serde_json::Value {
    serde_json::json!({"column": column, "operator": operator, "value": value})
}

/// Builds a Scan argument on `table`.
pub fn query(table: &str, conditions: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({"table": table, "conditions": conditions})
}
