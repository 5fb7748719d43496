//! # tabledger Core
//!
//! A relational-table abstraction implemented as contracts over a
//! versioned asset ledger.
//!
//! Tables, records and index buckets are all ledger assets, and nothing is
//! ever mutated in place: every write is a new version. Index buckets store
//! deltas, and a scan rebuilds bucket membership by replaying them.
//!
//! ## Contracts
//!
//! | Contract | Argument | Result |
//! |----------|----------|--------|
//! | [`Create`] | `{table, key, key_type, indexes?}` | none |
//! | [`Insert`] | `{table, values}` | none |
//! | [`Update`] | `{table, values, conditions}` | none |
//! | [`Scan`] | `{table, conditions, projections?, options?}` | records |
//! | [`Select`] | as Scan | projected records |
//! | [`GetHistory`] | `{table, key, limit?}` | `[{age, values}]` |
//! | [`ShowTables`] | `{table?}` | definitions |
//!
//! ## Determinism
//!
//! The same invocation is executed independently by more than one ledger
//! operator and the results are compared. Every decision a contract makes
//! is a function of its argument and the snapshot it reads; asset ids are
//! built from canonical key text, and index replay and scan results are
//! ordered by key.
//!
//! ## Example
//!
//! ```rust
//! use tabledger_codec::Value;
//! use tabledger_core::ContractRegistry;
//! use tabledger_ledger::InMemoryLedger;
//!
//! let registry = ContractRegistry::default();
//! let ledger = InMemoryLedger::new();
//!
//! let create: serde_json::Value = serde_json::json!({
//!     "table": "tbl",
//!     "key": "pkey",
//!     "key_type": "string",
//!     "indexes": [{"key": "some_idx", "key_type": "number"}],
//! });
//! registry
//!     .execute_named(&ledger, "Create", &Value::from_json(&create).unwrap())
//!     .unwrap();
//!
//! let insert = serde_json::json!({"table": "tbl", "values": {"pkey": "k1", "some_idx": 1}});
//! registry
//!     .execute_named(&ledger, "Insert", &Value::from_json(&insert).unwrap())
//!     .unwrap();
//!
//! let scan = serde_json::json!({
//!     "table": "tbl",
//!     "conditions": [{"column": "some_idx", "operator": "=", "value": 1}],
//! });
//! let found = registry
//!     .execute_named(&ledger, "Scan", &Value::from_json(&scan).unwrap())
//!     .unwrap()
//!     .output
//!     .unwrap();
//! assert_eq!(found.as_array().unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod args;
pub mod asset_id;
mod config;
mod contract;
mod error;
pub mod index;
pub mod query;
pub mod schema;

pub use config::{Config, DEFAULT_NAMESPACE};
pub use contract::{
    names, Contract, ContractRegistry, Create, GetHistory, Insert, Scan, Select, ShowTables,
    SubContractInvoker, Update, METADATA_AGE,
};
pub use error::{ContractError, ContractResult, ErrorCode};
pub use schema::{IndexDefinition, KeyType, TableDefinition};
