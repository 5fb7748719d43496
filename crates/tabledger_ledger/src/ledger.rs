//! Ledger trait definition.

use crate::asset::{Asset, AssetFilter};
use crate::error::LedgerResult;
use tabledger_codec::Value;

/// The view of the ledger available to one contract invocation.
///
/// A `Ledger` is a versioned, append-only map from asset id to documents.
/// Contracts never see storage engines, transactions or consensus; they see
/// only these three operations.
///
/// # Invariants
///
/// - `get` returns the latest version visible to the invocation
/// - `put` appends a new immutable version; earlier versions stay readable
/// - `scan` returns versions of exactly one asset, filtered and ordered
/// - reads are answered from the snapshot taken when the invocation began;
///   writes become visible only after the invocation commits
///
/// # Implementors
///
/// - [`crate::LedgerTransaction`] - a transaction on an [`crate::InMemoryLedger`]
pub trait Ledger {
    /// Returns the latest version of an asset, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored document cannot be decoded or fails
    /// verification.
    fn get(&mut self, asset_id: &str) -> LedgerResult<Option<Asset>>;

    /// Appends a new version of an asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset id is invalid or the document cannot
    /// be encoded.
    fn put(&mut self, asset_id: &str, data: Value) -> LedgerResult<()>;

    /// Returns the versions of an asset selected by `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored document cannot be decoded or fails
    /// verification.
    fn scan(&mut self, filter: &AssetFilter) -> LedgerResult<Vec<Asset>>;
}
