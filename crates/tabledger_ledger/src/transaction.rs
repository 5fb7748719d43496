//! Transactions on the in-memory ledger.

use crate::asset::{Asset, AssetFilter};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::memory::{chain_hash, InMemoryLedger, StoredVersion, GENESIS_HASH};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use tabledger_codec::{to_canonical_cbor, Value};

/// Summary of the writes applied by one commit.
///
/// Two replicas that execute the same invocation from the same state
/// produce the same digest; a mismatch means one of them diverged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// `(asset id, age)` of every version written, ordered by asset id.
    pub writes: Vec<(String, u64)>,
    /// `SHA-256` over the ordered `(id, age, canonical bytes)` write set.
    pub digest: [u8; 32],
}

impl CommitReceipt {
    /// Returns the number of versions written.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Returns the digest as lowercase hex.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        self.digest.iter().fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
    }
}

/// An active transaction on an [`InMemoryLedger`].
///
/// Reads are answered from the snapshot taken at begin. Writes are buffered
/// with at most one pending document per asset id (a later `put` replaces an
/// earlier one) and are applied atomically by [`LedgerTransaction::commit`].
#[derive(Debug)]
pub struct LedgerTransaction<'a> {
    ledger: &'a InMemoryLedger,
    snapshot_seq: u64,
    /// Asset ids read, for conflict detection.
    reads: BTreeSet<String>,
    /// Pending writes: asset id -> document.
    writes: BTreeMap<String, Value>,
}

impl<'a> LedgerTransaction<'a> {
    pub(crate) fn new(ledger: &'a InMemoryLedger, snapshot_seq: u64) -> Self {
        Self {
            ledger,
            snapshot_seq,
            reads: BTreeSet::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Returns the snapshot sequence number.
    #[must_use]
    pub fn snapshot_seq(&self) -> u64 {
        self.snapshot_seq
    }

    /// Returns the number of pending writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Returns the pending document for an asset, if any.
    #[must_use]
    pub fn pending_write(&self, asset_id: &str) -> Option<&Value> {
        self.writes.get(asset_id)
    }

    /// Commits all pending writes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Conflict`] if any asset read or written by this
    /// transaction gained a version after the snapshot, or a codec error if
    /// a pending document cannot be encoded. Nothing is applied on error.
    pub fn commit(self) -> LedgerResult<CommitReceipt> {
        let mut encoded = Vec::with_capacity(self.writes.len());
        for (asset_id, data) in &self.writes {
            encoded.push((asset_id.as_str(), to_canonical_cbor(data)?));
        }

        let mut state = self.ledger.state().write();

        for asset_id in self.reads.iter().map(String::as_str).chain(self.writes.keys().map(String::as_str)) {
            let changed = state.assets.get(asset_id).is_some_and(|versions| {
                versions
                    .last()
                    .is_some_and(|v| v.committed_seq > self.snapshot_seq)
            });
            if changed {
                tracing::warn!(asset_id, snapshot_seq = self.snapshot_seq, "commit conflict");
                return Err(LedgerError::conflict(asset_id));
            }
        }

        let commit_seq = state.commit_seq + 1;
        let mut hasher = Sha256::new();
        let mut writes = Vec::with_capacity(encoded.len());

        for (asset_id, bytes) in encoded {
            let versions = state.assets.entry(asset_id.to_string()).or_default();
            let age = versions.len() as u64;
            let prev = versions.last().map_or(GENESIS_HASH, |v| v.hash);
            let hash = chain_hash(&prev, asset_id, age, &bytes);

            hasher.update((asset_id.len() as u64).to_be_bytes());
            hasher.update(asset_id.as_bytes());
            hasher.update(age.to_be_bytes());
            hasher.update(&bytes);

            versions.push(StoredVersion {
                bytes,
                hash,
                committed_seq: commit_seq,
            });
            writes.push((asset_id.to_string(), age));
        }

        if !writes.is_empty() {
            state.commit_seq = commit_seq;
        }
        tracing::debug!(writes = writes.len(), commit_seq, "ledger commit");

        Ok(CommitReceipt {
            writes,
            digest: hasher.finalize().into(),
        })
    }

    /// Discards all pending writes.
    pub fn abort(self) {
        tracing::debug!(discarded = self.writes.len(), "ledger abort");
    }
}

impl Ledger for LedgerTransaction<'_> {
    fn get(&mut self, asset_id: &str) -> LedgerResult<Option<Asset>> {
        self.reads.insert(asset_id.to_string());
        self.ledger.read_latest(asset_id, self.snapshot_seq)
    }

    fn put(&mut self, asset_id: &str, data: Value) -> LedgerResult<()> {
        if asset_id.is_empty() {
            return Err(LedgerError::InvalidAssetId(asset_id.to_string()));
        }
        tracing::trace!(asset_id, "buffered put");
        self.writes.insert(asset_id.to_string(), data);
        Ok(())
    }

    fn scan(&mut self, filter: &AssetFilter) -> LedgerResult<Vec<Asset>> {
        self.reads.insert(filter.asset_id.clone());
        self.ledger.read_versions(filter, self.snapshot_seq)
    }
}
