//! In-memory reference ledger.

use crate::asset::{AgeOrder, Asset, AssetFilter};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::transaction::{CommitReceipt, LedgerTransaction};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tabledger_codec::{from_cbor, Value};

/// Hash that precedes age 0 in every chain.
pub(crate) const GENESIS_HASH: [u8; 32] = [0u8; 32];

/// One committed version as stored.
#[derive(Debug, Clone)]
pub(crate) struct StoredVersion {
    /// Canonical CBOR of the document.
    pub(crate) bytes: Vec<u8>,
    /// `SHA-256(prev_hash ‖ id ‖ age ‖ bytes)`.
    pub(crate) hash: [u8; 32],
    /// Commit sequence that made this version visible.
    pub(crate) committed_seq: u64,
}

#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub(crate) assets: BTreeMap<String, Vec<StoredVersion>>,
    pub(crate) commit_seq: u64,
}

/// The result of [`InMemoryLedger::execute`].
#[derive(Debug)]
pub struct Executed<T> {
    /// Value returned by the closure.
    pub output: T,
    /// Writes applied by the commit.
    pub receipt: CommitReceipt,
}

/// An in-memory, hash-chained asset ledger.
///
/// This ledger is suitable for:
/// - Unit and integration tests of contracts
/// - Replaying the same invocation on independent replicas and comparing
///   their [`CommitReceipt`] digests
///
/// Versions are stored as canonical CBOR, so every read decodes a fresh
/// document and nothing obtained from the ledger can alias stored state.
///
/// # Example
///
/// ```rust
/// use tabledger_codec::Value;
/// use tabledger_ledger::{InMemoryLedger, Ledger, LedgerError};
///
/// let ledger = InMemoryLedger::new();
/// ledger
///     .execute(|txn| -> Result<(), LedgerError> {
///         txn.put("table:users", Value::from("definition"))
///     })
///     .unwrap();
/// assert_eq!(ledger.latest_age("table:users"), Some(0));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    config: LedgerConfig,
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Creates a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty ledger with custom configuration.
    #[must_use]
    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Begins a transaction reading from the current committed state.
    pub fn begin(&self) -> LedgerTransaction<'_> {
        let snapshot_seq = self.state.read().commit_seq;
        LedgerTransaction::new(self, snapshot_seq)
    }

    /// Executes a function within a transaction.
    ///
    /// If the function returns `Ok`, the transaction is committed and the
    /// receipt is returned alongside its output. If it returns `Err`, every
    /// buffered write is discarded.
    pub fn execute<F, T, E>(&self, f: F) -> Result<Executed<T>, E>
    where
        F: FnOnce(&mut LedgerTransaction<'_>) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut txn = self.begin();
        match f(&mut txn) {
            Ok(output) => {
                let receipt = txn.commit()?;
                Ok(Executed { output, receipt })
            }
            Err(e) => {
                txn.abort();
                Err(e)
            }
        }
    }

    /// Returns the latest committed age of an asset.
    #[must_use]
    pub fn latest_age(&self, asset_id: &str) -> Option<u64> {
        let state = self.state.read();
        state
            .assets
            .get(asset_id)
            .and_then(|versions| versions.len().checked_sub(1))
            .map(|age| age as u64)
    }

    /// Returns the number of committed versions of an asset.
    #[must_use]
    pub fn version_count(&self, asset_id: &str) -> usize {
        self.state.read().assets.get(asset_id).map_or(0, Vec::len)
    }

    /// Returns every asset id with at least one version, in order.
    #[must_use]
    pub fn asset_ids(&self) -> Vec<String> {
        self.state.read().assets.keys().cloned().collect()
    }

    /// Returns the total number of committed versions across all assets.
    #[must_use]
    pub fn total_versions(&self) -> usize {
        self.state.read().assets.values().map(Vec::len).sum()
    }

    /// Recomputes the hash chain of an asset.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Tampered`] naming the first version whose
    /// stored hash does not match.
    pub fn verify(&self, asset_id: &str) -> LedgerResult<()> {
        let state = self.state.read();
        match state.assets.get(asset_id) {
            Some(versions) => verify_chain(asset_id, versions),
            None => Ok(()),
        }
    }

    /// Recomputes the hash chain of every asset.
    ///
    /// # Errors
    ///
    /// Returns the first verification failure.
    pub fn verify_all(&self) -> LedgerResult<()> {
        let state = self.state.read();
        for (asset_id, versions) in &state.assets {
            verify_chain(asset_id, versions)?;
        }
        Ok(())
    }

    /// Returns the latest version visible at `snapshot_seq`.
    pub(crate) fn read_latest(
        &self,
        asset_id: &str,
        snapshot_seq: u64,
    ) -> LedgerResult<Option<Asset>> {
        let state = self.state.read();
        let Some(versions) = state.assets.get(asset_id) else {
            return Ok(None);
        };
        let visible = visible_len(versions, snapshot_seq);
        if visible == 0 {
            return Ok(None);
        }
        if self.config.verify_on_read {
            verify_chain(asset_id, &versions[..visible])?;
        }
        let age = visible - 1;
        decode_version(asset_id, age, &versions[age]).map(Some)
    }

    /// Returns the versions visible at `snapshot_seq` selected by `filter`.
    pub(crate) fn read_versions(
        &self,
        filter: &AssetFilter,
        snapshot_seq: u64,
    ) -> LedgerResult<Vec<Asset>> {
        let state = self.state.read();
        let Some(versions) = state.assets.get(&filter.asset_id) else {
            return Ok(Vec::new());
        };
        let visible = &versions[..visible_len(versions, snapshot_seq)];
        if self.config.verify_on_read {
            verify_chain(&filter.asset_id, visible)?;
        }

        let mut ages: Vec<usize> = (0..visible.len())
            .filter(|age| filter.contains_age(*age as u64))
            .collect();
        if filter.age_order == AgeOrder::Desc {
            ages.reverse();
        }
        if let Some(limit) = filter.limit {
            ages.truncate(limit);
        }

        ages.into_iter()
            .map(|age| decode_version(&filter.asset_id, age, &visible[age]))
            .collect()
    }

    pub(crate) fn state(&self) -> &RwLock<LedgerState> {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn overwrite_for_test(&self, asset_id: &str, age: usize, data: &Value) {
        let bytes = tabledger_codec::to_canonical_cbor(data).unwrap();
        let mut state = self.state.write();
        state.assets.get_mut(asset_id).unwrap()[age].bytes = bytes;
    }
}

/// Number of versions committed at or before `snapshot_seq`.
fn visible_len(versions: &[StoredVersion], snapshot_seq: u64) -> usize {
    versions.partition_point(|v| v.committed_seq <= snapshot_seq)
}

fn decode_version(asset_id: &str, age: usize, version: &StoredVersion) -> LedgerResult<Asset> {
    let data: Value = from_cbor(&version.bytes)?;
    Ok(Asset::new(asset_id, age as u64, data, version.hash))
}

pub(crate) fn chain_hash(prev: &[u8; 32], asset_id: &str, age: u64, bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(prev);
    hasher.update((asset_id.len() as u64).to_be_bytes());
    hasher.update(asset_id.as_bytes());
    hasher.update(age.to_be_bytes());
    hasher.update(bytes);
    hasher.finalize().into()
}

fn verify_chain(asset_id: &str, versions: &[StoredVersion]) -> LedgerResult<()> {
    let mut prev = GENESIS_HASH;
    for (age, version) in versions.iter().enumerate() {
        let expected = chain_hash(&prev, asset_id, age as u64, &version.bytes);
        if expected != version.hash {
            tracing::warn!(asset_id, age, "hash chain mismatch");
            return Err(LedgerError::tampered(asset_id, age as u64));
        }
        prev = version.hash;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use proptest::prelude::*;

    fn put_versions(ledger: &InMemoryLedger, asset_id: &str, count: i64) {
        for n in 0..count {
            ledger
                .execute(|txn| -> LedgerResult<()> { txn.put(asset_id, Value::Integer(n)) })
                .unwrap();
        }
    }

    #[test]
    fn memory_new_is_empty() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.total_versions(), 0);
        assert!(ledger.asset_ids().is_empty());
        assert_eq!(ledger.latest_age("missing"), None);
    }

    #[test]
    fn ages_start_at_zero_and_increase() {
        let ledger = InMemoryLedger::new();
        put_versions(&ledger, "a", 3);
        assert_eq!(ledger.latest_age("a"), Some(2));
        assert_eq!(ledger.version_count("a"), 3);

        let mut txn = ledger.begin();
        let latest = txn.get("a").unwrap().unwrap();
        assert_eq!(latest.age(), 2);
        assert_eq!(latest.data(), &Value::Integer(2));
    }

    #[test]
    fn scan_orders_and_limits() {
        let ledger = InMemoryLedger::new();
        put_versions(&ledger, "a", 4);
        let mut txn = ledger.begin();

        let asc = txn.scan(&AssetFilter::new("a")).unwrap();
        let ages: Vec<u64> = asc.iter().map(Asset::age).collect();
        assert_eq!(ages, vec![0, 1, 2, 3]);

        let desc = txn
            .scan(
                &AssetFilter::new("a")
                    .with_age_order(AgeOrder::Desc)
                    .with_limit(2),
            )
            .unwrap();
        let ages: Vec<u64> = desc.iter().map(Asset::age).collect();
        assert_eq!(ages, vec![3, 2]);

        let bounded = txn
            .scan(&AssetFilter::new("a").with_start_age(1).with_end_age(2))
            .unwrap();
        let ages: Vec<u64> = bounded.iter().map(Asset::age).collect();
        assert_eq!(ages, vec![1, 2]);
    }

    #[test]
    fn scan_missing_asset_is_empty() {
        let ledger = InMemoryLedger::new();
        let mut txn = ledger.begin();
        assert!(txn.scan(&AssetFilter::new("nothing")).unwrap().is_empty());
    }

    #[test]
    fn verify_detects_tampering() {
        let ledger = InMemoryLedger::new();
        put_versions(&ledger, "a", 3);
        assert!(ledger.verify("a").is_ok());

        ledger.overwrite_for_test("a", 1, &Value::from("forged"));
        assert!(matches!(
            ledger.verify("a"),
            Err(LedgerError::Tampered { age: 1, .. })
        ));
        assert!(ledger.verify_all().is_err());
    }

    #[test]
    fn verify_on_read_rejects_tampered_asset() {
        let ledger = InMemoryLedger::with_config(LedgerConfig::new().verify_on_read(true));
        put_versions(&ledger, "a", 2);
        ledger.overwrite_for_test("a", 0, &Value::from("forged"));

        let mut txn = ledger.begin();
        assert!(matches!(txn.get("a"), Err(LedgerError::Tampered { .. })));
        assert!(matches!(
            txn.scan(&AssetFilter::new("a")),
            Err(LedgerError::Tampered { .. })
        ));
    }

    #[test]
    fn documents_read_back_are_independent_copies() {
        let ledger = InMemoryLedger::new();
        ledger
            .execute(|txn| -> LedgerResult<()> {
                txn.put("doc", Value::map([("n", Value::Integer(1))]))
            })
            .unwrap();

        let mut txn = ledger.begin();
        let first = txn.get("doc").unwrap().unwrap().into_data();
        let mut changed = first.clone();
        if let Value::Map(fields) = &mut changed {
            fields.insert("n".to_string(), Value::Integer(2));
        }
        let second = txn.get("doc").unwrap().unwrap().into_data();
        assert_eq!(first, second);
    }

    fn document_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::Integer),
            "[a-z0-9 ]{0,12}".prop_map(Value::Text),
            any::<bool>().prop_map(Value::Bool),
            (-1.0e9f64..1.0e9).prop_map(Value::Double),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn appended_chains_verify(
            writes in prop::collection::vec(("[abc]", document_strategy()), 1..32),
        ) {
            let ledger = InMemoryLedger::new();
            let mut counts: BTreeMap<String, u64> = BTreeMap::new();
            for (asset_id, document) in &writes {
                ledger
                    .execute(|txn| -> LedgerResult<()> { txn.put(asset_id, document.clone()) })
                    .unwrap();
                *counts.entry(asset_id.clone()).or_default() += 1;
            }

            prop_assert!(ledger.verify_all().is_ok());
            prop_assert_eq!(ledger.total_versions(), writes.len());
            for (asset_id, count) in &counts {
                prop_assert_eq!(ledger.latest_age(asset_id), Some(count - 1));
            }

            let (last_id, last_document) = writes.last().unwrap();
            let mut txn = ledger.begin();
            let latest = txn.get(last_id).unwrap().unwrap();
            prop_assert_eq!(latest.data(), last_document);
        }
    }
}
