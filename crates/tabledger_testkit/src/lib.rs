//! # tabledger Testkit
//!
//! Test utilities for tabledger.
//!
//! This crate provides:
//! - A table harness pairing an in-memory ledger with the contract registry
//! - Property-based test generators using proptest
//! - A replica pair that runs every invocation on a Ledger and an Auditor
//!   and checks they agree
//! - Key-text test vectors
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use tabledger_testkit::prelude::*;
//!
//! let harness = TableHarness::new();
//! harness.create(json!({"table": "t", "key": "id", "key_type": "number"})).unwrap();
//! harness.insert(json!({"table": "t", "values": {"id": 1}})).unwrap();
//! let found = harness
//!     .scan(json!({"table": "t", "conditions": [{"column": "id", "operator": "=", "value": 1}]}))
//!     .unwrap();
//! assert_eq!(found, json!([{"id": 1}]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use vectors::*;
