//! Cross-replica integration helpers.
//!
//! Every invocation is executed twice, once by the Ledger and once by the
//! Auditor, each on its own copy of the state. The replicas must agree on
//! the result and on the exact write set.

use crate::fixtures::{arg, to_json, TableHarness};
use tabledger_core::{ContractError, ContractResult};
use tabledger_ledger::CommitReceipt;

/// The outcome of one invocation on one replica.
#[derive(Debug)]
pub struct ReplicaOutcome {
    /// The contract result as JSON.
    pub result: serde_json::Value,
    /// The commit receipt.
    pub receipt: CommitReceipt,
}

/// Two independent replicas executing the same invocations.
#[derive(Debug, Default)]
pub struct ReplicaPair {
    /// The Ledger replica.
    pub ledger: TableHarness,
    /// The Auditor replica.
    pub auditor: TableHarness,
}

impl ReplicaPair {
    /// Creates two empty replicas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the contract called `name` on both replicas.
    ///
    /// # Panics
    ///
    /// Panics if the replicas disagree on the result, on the write set, or
    /// on whether the invocation failed.
    pub fn invoke(&self, name: &str, argument: serde_json::Value) -> ContractResult<ReplicaOutcome> {
        let on_ledger = run(&self.ledger, name, &argument);
        let on_auditor = run(&self.auditor, name, &argument);

        match (on_ledger, on_auditor) {
            (Ok(left), Ok(right)) => {
                assert_eq!(left.result, right.result, "replicas returned different results for {name}");
                assert_eq!(
                    left.receipt.digest_hex(),
                    right.receipt.digest_hex(),
                    "replicas wrote different assets for {name}: {:?} vs {:?}",
                    left.receipt.writes,
                    right.receipt.writes
                );
                Ok(left)
            }
            (Err(left), Err(right)) => {
                assert_eq!(left.to_string(), right.to_string(), "replicas failed differently for {name}");
                Err(left)
            }
            (left, right) => panic!(
                "replicas disagree on {name}: ledger {:?}, auditor {:?}",
                left.map(|o| o.result),
                right.map(|o| o.result)
            ),
        }
    }

    /// Returns true if both replicas hold the same assets at the same ages.
    pub fn in_sync(&self) -> bool {
        let ids = self.ledger.ledger.asset_ids();
        ids == self.auditor.ledger.asset_ids()
            && ids.iter().all(|id| {
                self.ledger.ledger.latest_age(id) == self.auditor.ledger.latest_age(id)
            })
    }
}

fn run(harness: &TableHarness, name: &str, argument: &serde_json::Value) -> ContractResult<ReplicaOutcome> {
    let executed = harness
        .registry
        .execute_named(&harness.ledger, name, &arg(argument.clone()))?;
    Ok(ReplicaOutcome {
        result: to_json(executed.output),
        receipt: executed.receipt,
    })
}

/// Returns the failure constant of an error as text, for assertions.
pub fn error_code(err: &ContractError) -> String {
    err.code().map_or_else(|| err.to_string(), |code| code.as_str().to_string())
}
