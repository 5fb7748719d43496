//! # tabledger Codec
//!
//! Document values and their deterministic encodings.
//!
//! Table contracts execute independently on more than one ledger operator
//! and the results are cross-checked, so every byte derived from a value must
//! be identical everywhere. This crate provides:
//! - [`Value`], the closed document type shared by arguments, records and
//!   index deltas
//! - [`key_text`], the canonical text form of a scalar used in asset ids
//! - canonical CBOR, the storage form of every asset version
//! - JSON conversion for contract arguments and results
//!
//! ## Canonical CBOR Rules
//!
//! - Maps are sorted by key (length-first, then bytewise)
//! - Integers use shortest encoding; big integers use bignum tags 2 and 3
//! - Doubles always use the 8-byte form; NaN and infinities are rejected
//! - No indefinite-length items
//!
//! ## Usage
//!
//! ```
//! use tabledger_codec::{from_cbor, key_text, to_canonical_cbor, Value};
//!
//! let value = Value::map([("pkey", Value::from("k1")), ("n", Value::Double(1.0))]);
//! let bytes = to_canonical_cbor(&value).unwrap();
//! assert_eq!(from_cbor(&bytes).unwrap(), value);
//!
//! assert_eq!(key_text(&Value::Double(1.0)), key_text(&Value::Integer(1)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod json;
mod text;
mod value;

pub use decoder::{from_cbor, CanonicalDecoder};
pub use encoder::{to_canonical_cbor, CanonicalEncoder};
pub use error::{CodecError, CodecResult};
pub use text::key_text;
pub use value::Value;

/// Trait for types that can be encoded to canonical CBOR.
pub trait Encode {
    /// Encode this value to canonical CBOR bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from CBOR.
pub trait Decode: Sized {
    /// Decode this value from CBOR bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl Encode for Value {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_canonical_cbor(self)
    }
}

impl Decode for Value {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes)
    }
}
