//! Canonical CBOR decoder.

use crate::encoder::{TAG_NEGATIVE_BIGNUM, TAG_POSITIVE_BIGNUM};
use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use num_bigint::{BigInt, Sign};
use std::collections::BTreeMap;

/// Decode a single value from CBOR bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid canonical CBOR, contain
/// forbidden constructs (non-finite doubles, indefinite lengths), or carry
/// trailing bytes after the value.
pub fn from_cbor(bytes: &[u8]) -> CodecResult<Value> {
    let mut decoder = CanonicalDecoder::new(bytes);
    let value = decoder.decode()?;
    if !decoder.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: decoder.remaining().len(),
        });
    }
    Ok(value)
}

/// A canonical CBOR decoder.
///
/// This decoder validates that input follows canonical CBOR rules
/// and rejects forbidden constructs.
pub struct CanonicalDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

/// Maximum allowed element count for arrays and maps.
const MAX_CONTAINER_ELEMENTS: u64 = 16 * 1024 * 1024;

/// Maximum allowed byte/string length.
const MAX_BYTES_LENGTH: u64 = 256 * 1024 * 1024;

impl<'a> CanonicalDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Decode the next value.
    #[allow(clippy::cast_possible_wrap)]
    pub fn decode(&mut self) -> CodecResult<Value> {
        let initial_byte = self.read_byte()?;
        let major_type = initial_byte >> 5;
        let additional_info = initial_byte & 0x1f;

        match major_type {
            0 => {
                let n = self.decode_unsigned(additional_info)?;
                i64::try_from(n)
                    .map(Value::Integer)
                    .map_err(|_| CodecError::invalid_structure("unsigned integer beyond i64"))
            }
            1 => {
                let n = self.decode_unsigned(additional_info)?;
                i64::try_from(n)
                    .map(|n| Value::Integer(-n - 1))
                    .map_err(|_| CodecError::invalid_structure("negative integer beyond i64"))
            }
            2 => Err(CodecError::unsupported_type("byte string")),
            3 => self.decode_text(additional_info),
            4 => self.decode_array(additional_info),
            5 => self.decode_map(additional_info),
            6 => {
                let tag = self.decode_unsigned(additional_info)?;
                self.decode_tagged(tag)
            }
            7 => self.decode_simple(additional_info),
            _ => Err(CodecError::invalid_structure("invalid major type")),
        }
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    #[inline]
    fn read_byte(&mut self) -> CodecResult<u8> {
        if self.pos >= self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn decode_unsigned(&mut self, additional_info: u8) -> CodecResult<u64> {
        let non_canonical =
            || CodecError::invalid_structure("non-canonical: value could be encoded in fewer bytes");
        match additional_info {
            0..=23 => Ok(u64::from(additional_info)),
            24 => {
                let byte = self.read_byte()?;
                if byte < 24 {
                    return Err(non_canonical());
                }
                Ok(u64::from(byte))
            }
            25 => {
                let bytes = self.read_bytes(2)?;
                let value = u16::from_be_bytes([bytes[0], bytes[1]]);
                if u8::try_from(value).is_ok() {
                    return Err(non_canonical());
                }
                Ok(u64::from(value))
            }
            26 => {
                let bytes = self.read_bytes(4)?;
                let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                if u16::try_from(value).is_ok() {
                    return Err(non_canonical());
                }
                Ok(u64::from(value))
            }
            27 => {
                let bytes = self.read_bytes(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                let value = u64::from_be_bytes(raw);
                if u32::try_from(value).is_ok() {
                    return Err(non_canonical());
                }
                Ok(value)
            }
            28..=30 => Err(CodecError::invalid_structure("reserved additional info")),
            _ => Err(CodecError::IndefiniteLengthForbidden),
        }
    }

    fn decode_length(&mut self, additional_info: u8, max_allowed: u64) -> CodecResult<usize> {
        let claimed = self.decode_unsigned(additional_info)?;
        if claimed > max_allowed {
            return Err(CodecError::SizeLimitExceeded {
                claimed,
                max_allowed,
            });
        }
        usize::try_from(claimed).map_err(|_| CodecError::SizeLimitExceeded {
            claimed,
            max_allowed,
        })
    }

    fn decode_text(&mut self, additional_info: u8) -> CodecResult<Value> {
        Ok(Value::Text(self.read_text(additional_info)?))
    }

    fn read_text(&mut self, additional_info: u8) -> CodecResult<String> {
        let len = self.decode_length(additional_info, MAX_BYTES_LENGTH)?;
        let bytes = self.read_bytes(len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
        Ok(text.to_string())
    }

    fn decode_array(&mut self, additional_info: u8) -> CodecResult<Value> {
        let len = self.decode_length(additional_info, MAX_CONTAINER_ELEMENTS)?;
        let mut items = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            items.push(self.decode()?);
        }
        Ok(Value::Array(items))
    }

    fn decode_map(&mut self, additional_info: u8) -> CodecResult<Value> {
        let len = self.decode_length(additional_info, MAX_CONTAINER_ELEMENTS)?;
        let mut fields = BTreeMap::new();
        let mut prev_key: Option<String> = None;

        for _ in 0..len {
            let key_byte = self.read_byte()?;
            if key_byte >> 5 != 3 {
                return Err(CodecError::unsupported_type("non-text map key"));
            }
            let key = self.read_text(key_byte & 0x1f)?;

            // Keys must be strictly increasing, length-first then bytewise
            if let Some(prev) = &prev_key {
                let ordering = match prev.len().cmp(&key.len()) {
                    std::cmp::Ordering::Equal => prev.as_bytes().cmp(key.as_bytes()),
                    other => other,
                };
                if ordering != std::cmp::Ordering::Less {
                    return Err(CodecError::invalid_structure(
                        "non-canonical: map keys not in sorted order",
                    ));
                }
            }

            let value = self.decode()?;
            fields.insert(key.clone(), value);
            prev_key = Some(key);
        }

        Ok(Value::Map(fields))
    }

    fn decode_tagged(&mut self, tag: u64) -> CodecResult<Value> {
        if tag != TAG_POSITIVE_BIGNUM && tag != TAG_NEGATIVE_BIGNUM {
            return Err(CodecError::unsupported_type(format!("tag {tag}")));
        }
        let header = self.read_byte()?;
        if header >> 5 != 2 {
            return Err(CodecError::invalid_structure("bignum payload must be a byte string"));
        }
        let len = self.decode_length(header & 0x1f, MAX_BYTES_LENGTH)?;
        let magnitude = self.read_bytes(len)?;
        if magnitude.first() == Some(&0) {
            return Err(CodecError::invalid_structure(
                "non-canonical: bignum has leading zero bytes",
            ));
        }

        let arg = BigInt::from_bytes_be(Sign::Plus, magnitude);
        let n = if tag == TAG_POSITIVE_BIGNUM { arg } else { -arg - 1u32 };
        match Value::big_integer(n) {
            Value::Integer(_) => Err(CodecError::invalid_structure(
                "non-canonical: bignum fits in a plain integer",
            )),
            big => Ok(big),
        }
    }

    fn decode_simple(&mut self, additional_info: u8) -> CodecResult<Value> {
        match additional_info {
            20 => Ok(Value::Bool(false)),
            21 => Ok(Value::Bool(true)),
            22 => Ok(Value::Null),
            25 | 26 => Err(CodecError::invalid_structure(
                "non-canonical: doubles must use 8-byte encoding",
            )),
            27 => {
                let bytes = self.read_bytes(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                let d = f64::from_bits(u64::from_be_bytes(raw));
                if !d.is_finite() {
                    return Err(CodecError::NonFiniteForbidden);
                }
                Ok(Value::Double(d))
            }
            28..=30 => Err(CodecError::invalid_structure("reserved additional info")),
            31 => Err(CodecError::invalid_structure("break without indefinite")),
            _ => Err(CodecError::unsupported_type(format!(
                "simple value {additional_info}"
            ))),
        }
    }
}
