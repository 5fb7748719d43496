//! # tabledger Ledger
//!
//! The versioned asset ledger that table contracts run against.
//!
//! Contracts see the ledger only through the [`Ledger`] trait: `get` the
//! latest version of an asset, `put` a new version, and `scan` the versions
//! of one asset. Everything else (storage, transactions, consensus) lives
//! behind that seam.
//!
//! ## Reference Implementation
//!
//! [`InMemoryLedger`] is an in-process ledger used by tests and by replicas
//! that cross-check each other:
//!
//! - every invocation runs in a [`LedgerTransaction`] that reads a snapshot
//!   and buffers its writes
//! - commits are atomic and fail with [`LedgerError::Conflict`] if an asset
//!   the transaction touched changed concurrently
//! - every version is hash-chained to its predecessor
//! - every commit yields a [`CommitReceipt`] whose digest identifies the
//!   exact write set
//!
//! ## Example
//!
//! ```rust
//! use tabledger_codec::Value;
//! use tabledger_ledger::{AgeOrder, AssetFilter, InMemoryLedger, Ledger, LedgerError};
//!
//! let ledger = InMemoryLedger::new();
//! for n in 0..3 {
//!     ledger
//!         .execute(|txn| -> Result<(), LedgerError> { txn.put("counter", Value::Integer(n)) })
//!         .unwrap();
//! }
//!
//! let mut txn = ledger.begin();
//! let latest = txn
//!     .scan(&AssetFilter::new("counter").with_age_order(AgeOrder::Desc).with_limit(1))
//!     .unwrap();
//! assert_eq!(latest[0].age(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod config;
mod error;
mod ledger;
mod memory;
mod transaction;

pub use asset::{AgeOrder, Asset, AssetFilter};
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use memory::{Executed, InMemoryLedger};
pub use transaction::{CommitReceipt, LedgerTransaction};
