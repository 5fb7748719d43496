//! Error types for ledger operations.

use tabledger_codec::CodecError;
use thiserror::Error;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur while reading or writing assets.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A document could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// An asset read or written by the transaction changed after its snapshot.
    #[error("conflict on asset {asset_id}")]
    Conflict {
        /// The asset that gained a version concurrently.
        asset_id: String,
    },

    /// A stored version does not match its hash chain.
    #[error("tampered asset {asset_id} at age {age}")]
    Tampered {
        /// The asset whose chain failed verification.
        asset_id: String,
        /// The first age whose hash did not match.
        age: u64,
    },

    /// The asset id is empty.
    #[error("invalid asset id: {0:?}")]
    InvalidAssetId(String),
}

impl LedgerError {
    /// Creates a conflict error.
    pub fn conflict(asset_id: impl Into<String>) -> Self {
        Self::Conflict {
            asset_id: asset_id.into(),
        }
    }

    /// Creates a tampered error.
    pub fn tampered(asset_id: impl Into<String>, age: u64) -> Self {
        Self::Tampered {
            asset_id: asset_id.into(),
            age,
        }
    }
}
