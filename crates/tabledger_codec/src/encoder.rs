//! Canonical CBOR encoder.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use num_bigint::{BigInt, Sign};
use std::collections::BTreeMap;

/// CBOR tag for a positive bignum.
pub(crate) const TAG_POSITIVE_BIGNUM: u64 = 2;
/// CBOR tag for a negative bignum.
pub(crate) const TAG_NEGATIVE_BIGNUM: u64 = 3;

/// Encode a value to canonical CBOR bytes.
///
/// This function produces deterministic output following the canonical
/// CBOR rules specified in RFC 8949 Section 4.2.1:
/// - Map keys are sorted by their encoded form (length-first, then bytewise)
/// - Integers use the shortest possible encoding
/// - No indefinite-length encoding
///
/// Doubles are always written as 8-byte IEEE-754 so that the same number
/// never has two encodings.
///
/// # Errors
///
/// Returns an error if the value contains a NaN or infinite double.
pub fn to_canonical_cbor(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = CanonicalEncoder::new();
    encoder.encode(value)?;
    Ok(encoder.into_bytes())
}

/// A canonical CBOR encoder.
pub struct CanonicalEncoder {
    buffer: Vec<u8>,
}

impl CanonicalEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Encode a value.
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => {
                self.encode_null();
                Ok(())
            }
            Value::Bool(b) => {
                self.encode_bool(*b);
                Ok(())
            }
            Value::Integer(n) => {
                self.encode_integer(*n);
                Ok(())
            }
            Value::BigInteger(n) => {
                self.encode_big_integer(n);
                Ok(())
            }
            Value::Double(d) => self.encode_double(*d),
            Value::Text(s) => {
                self.encode_text(s);
                Ok(())
            }
            Value::Array(arr) => self.encode_array(arr),
            Value::Map(fields) => self.encode_map(fields),
        }
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn encode_null(&mut self) {
        self.buffer.push(0xf6);
    }

    fn encode_bool(&mut self, b: bool) {
        self.buffer.push(if b { 0xf5 } else { 0xf4 });
    }

    #[allow(clippy::cast_sign_loss)]
    fn encode_integer(&mut self, n: i64) {
        if n >= 0 {
            self.encode_unsigned(0, n as u64);
        } else {
            // CBOR negative integers encode -(n+1)
            let abs_minus_one = (-(n + 1)) as u64;
            self.encode_unsigned(1, abs_minus_one);
        }
    }

    fn encode_big_integer(&mut self, n: &BigInt) {
        if let Ok(small) = i64::try_from(n) {
            self.encode_integer(small);
            return;
        }
        let (tag, magnitude) = match n.sign() {
            Sign::Minus => {
                let arg: BigInt = -n - 1u32;
                (TAG_NEGATIVE_BIGNUM, arg.to_bytes_be().1)
            }
            Sign::NoSign | Sign::Plus => (TAG_POSITIVE_BIGNUM, n.to_bytes_be().1),
        };
        self.encode_unsigned(6, tag);
        self.encode_unsigned(2, magnitude.len() as u64);
        self.buffer.extend_from_slice(&magnitude);
    }

    fn encode_double(&mut self, d: f64) -> CodecResult<()> {
        if !d.is_finite() {
            return Err(CodecError::NonFiniteForbidden);
        }
        self.buffer.push(0xfb);
        self.buffer.extend_from_slice(&d.to_bits().to_be_bytes());
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_unsigned(&mut self, major_type: u8, value: u64) {
        let mt = major_type << 5;

        if value < 24 {
            self.buffer.push(mt | (value as u8));
        } else if u8::try_from(value).is_ok() {
            self.buffer.push(mt | 24);
            self.buffer.push(value as u8);
        } else if u16::try_from(value).is_ok() {
            self.buffer.push(mt | 25);
            self.buffer.extend_from_slice(&(value as u16).to_be_bytes());
        } else if u32::try_from(value).is_ok() {
            self.buffer.push(mt | 26);
            self.buffer.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buffer.push(mt | 27);
            self.buffer.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn encode_text(&mut self, text: &str) {
        self.encode_unsigned(3, text.len() as u64);
        self.buffer.extend_from_slice(text.as_bytes());
    }

    fn encode_array(&mut self, arr: &[Value]) -> CodecResult<()> {
        self.encode_unsigned(4, arr.len() as u64);
        for item in arr {
            self.encode(item)?;
        }
        Ok(())
    }

    fn encode_map(&mut self, fields: &BTreeMap<String, Value>) -> CodecResult<()> {
        // Text keys encode as header + UTF-8 bytes, so the canonical
        // length-first order is (byte length, bytes).
        let mut ordered: Vec<(&String, &Value)> = fields.iter().collect();
        ordered.sort_by(|a, b| match a.0.len().cmp(&b.0.len()) {
            std::cmp::Ordering::Equal => a.0.as_bytes().cmp(b.0.as_bytes()),
            other => other,
        });

        self.encode_unsigned(5, fields.len() as u64);
        for (key, value) in ordered {
            self.encode_text(key);
            self.encode(value)?;
        }

        Ok(())
    }
}

impl Default for CanonicalEncoder {
    fn default() -> Self {
        Self::new()
    }
}
