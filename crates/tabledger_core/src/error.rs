//! Error types for table contracts.

use std::fmt;
use tabledger_codec::CodecError;
use tabledger_ledger::LedgerError;
use thiserror::Error;

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// The fixed failure constants a table contract can raise.
///
/// Every variant displays as its constant name (`TABLE_NOT_EXIST`, ...),
/// which is the form callers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The Create argument does not have the expected fields.
    InvalidTableFormat,
    /// An index definition does not have the expected fields.
    InvalidIndexFormat,
    /// The Insert argument does not have the expected fields.
    InvalidRecordFormat,
    /// The Update argument does not have the expected fields.
    InvalidUpdateFormat,
    /// The Scan or Select argument does not have the expected fields.
    InvalidQueryFormat,
    /// A condition does not have the expected fields.
    InvalidConditionFormat,
    /// A condition names an unknown operator.
    InvalidOperator,
    /// Select projections are not an array of column names.
    InvalidProjectionFormat,
    /// Generic malformed argument (GetHistory, ShowTables).
    InvalidContractArguments,
    /// A table, key or index name is not a valid identifier.
    InvalidObjectName,
    /// A primary-key type or value is not of the declared type.
    InvalidKeyType,
    /// An index key type or value is not of the declared type.
    InvalidIndexKeyType,
    /// Create was called for a table that already exists.
    TableAlreadyExists,
    /// The named table does not exist.
    TableNotExist,
    /// Insert was called for a primary key that already exists.
    RecordAlreadyExists,
    /// The record does not contain its primary-key column.
    RecordKeyNotExist,
    /// Update tried to change the primary-key column.
    CannotUpdateKey,
    /// No condition can serve as an access path.
    InvalidKeySpecification,
    /// An index asset is malformed or references a missing record.
    IllegalIndexState,
}

impl ErrorCode {
    /// Returns the constant name of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTableFormat => "INVALID_TABLE_FORMAT",
            Self::InvalidIndexFormat => "INVALID_INDEX_FORMAT",
            Self::InvalidRecordFormat => "INVALID_RECORD_FORMAT",
            Self::InvalidUpdateFormat => "INVALID_UPDATE_FORMAT",
            Self::InvalidQueryFormat => "INVALID_QUERY_FORMAT",
            Self::InvalidConditionFormat => "INVALID_CONDITION_FORMAT",
            Self::InvalidOperator => "INVALID_OPERATOR",
            Self::InvalidProjectionFormat => "INVALID_PROJECTION_FORMAT",
            Self::InvalidContractArguments => "INVALID_CONTRACT_ARGUMENTS",
            Self::InvalidObjectName => "INVALID_OBJECT_NAME",
            Self::InvalidKeyType => "INVALID_KEY_TYPE",
            Self::InvalidIndexKeyType => "INVALID_INDEX_KEY_TYPE",
            Self::TableAlreadyExists => "TABLE_ALREADY_EXISTS",
            Self::TableNotExist => "TABLE_NOT_EXIST",
            Self::RecordAlreadyExists => "RECORD_ALREADY_EXISTS",
            Self::RecordKeyNotExist => "RECORD_KEY_NOT_EXIST",
            Self::CannotUpdateKey => "CANNOT_UPDATE_KEY",
            Self::InvalidKeySpecification => "INVALID_KEY_SPECIFICATION",
            Self::IllegalIndexState => "ILLEGAL_INDEX_STATE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a contract invocation.
///
/// Any error aborts the invocation, and with it every write the invocation
/// buffered. There is no partial success.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A contract rejected its argument or the ledger state.
    #[error("{}", render(*code, detail.as_deref()))]
    Contract {
        /// The failure constant.
        code: ErrorCode,
        /// Extra context, such as the offending name.
        detail: Option<String>,
    },

    /// The ledger failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A document could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// No contract is registered under the id.
    #[error("contract not found: {contract_id}")]
    ContractNotFound {
        /// The id that was looked up.
        contract_id: String,
    },
}

fn render(code: ErrorCode, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("{code}: {detail}"),
        None => code.to_string(),
    }
}

impl ContractError {
    /// Creates a contract error without detail.
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self::Contract { code, detail: None }
    }

    /// Creates a contract error with detail.
    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Contract {
            code,
            detail: Some(detail.into()),
        }
    }

    /// Creates a contract-not-found error.
    pub fn contract_not_found(contract_id: impl Into<String>) -> Self {
        Self::ContractNotFound {
            contract_id: contract_id.into(),
        }
    }

    /// Returns the failure constant, if this is a contract error.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Contract { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if the ledger holds inconsistent index state.
    ///
    /// Such failures point at an earlier write that skipped index
    /// maintenance, not at the caller.
    #[must_use]
    pub fn is_integrity_violation(&self) -> bool {
        self.code() == Some(ErrorCode::IllegalIndexState)
    }
}

impl From<ErrorCode> for ContractError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}
