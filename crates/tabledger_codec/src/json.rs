//! Conversion between [`Value`] and JSON.
//!
//! Contract arguments arrive as JSON documents. Numbers are classified once,
//! here: integers that fit in an `i64` become [`Value::Integer`], larger
//! integers become [`Value::BigInteger`], and anything written with a
//! fraction or exponent becomes [`Value::Double`].

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::str::FromStr;

impl Value {
    /// Builds a value from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if a number is not finite or cannot be parsed.
    pub fn from_json(json: &serde_json::Value) -> CodecResult<Self> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => number_from_json(n)?,
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<CodecResult<Vec<_>>>()?,
            ),
            serde_json::Value::Object(fields) => {
                let mut map = std::collections::BTreeMap::new();
                for (key, value) in fields {
                    map.insert(key.clone(), Value::from_json(value)?);
                }
                Value::Map(map)
            }
        })
    }

    /// Converts this value to a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the value holds a non-finite double.
    pub fn to_json(&self) -> CodecResult<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::Number((*n).into()),
            Value::BigInteger(n) => serde_json::Value::Number(
                serde_json::Number::from_str(&n.to_string())
                    .map_err(|e| CodecError::decoding_failed(e.to_string()))?,
            ),
            Value::Double(d) => serde_json::Value::Number(
                serde_json::Number::from_f64(*d).ok_or(CodecError::NonFiniteForbidden)?,
            ),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<CodecResult<Vec<_>>>()?,
            ),
            Value::Map(fields) => {
                let mut object = serde_json::Map::new();
                for (key, value) in fields {
                    object.insert(key.clone(), value.to_json()?);
                }
                serde_json::Value::Object(object)
            }
        })
    }
}

fn number_from_json(n: &serde_json::Number) -> CodecResult<Value> {
    if let Some(small) = n.as_i64() {
        return Ok(Value::Integer(small));
    }
    let text = n.to_string();
    if text.contains(['.', 'e', 'E']) {
        let d = f64::from_str(&text).map_err(|e| CodecError::decoding_failed(e.to_string()))?;
        if !d.is_finite() {
            return Err(CodecError::NonFiniteForbidden);
        }
        return Ok(Value::Double(d));
    }
    BigInt::from_str(&text)
        .map(Value::big_integer)
        .map_err(|e| CodecError::decoding_failed(e.to_string()))
}

impl TryFrom<&serde_json::Value> for Value {
    type Error = CodecError;

    fn try_from(json: &serde_json::Value) -> Result<Self, Self::Error> {
        Value::from_json(json)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = CodecError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Value::from_json(&json)
    }
}

/// Big integers beyond the 128-bit range serialize as decimal strings.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::BigInteger(n) => match (n.to_i128(), n.to_u128()) {
                (Some(v), _) => serializer.serialize_i128(v),
                (None, Some(v)) => serializer.serialize_u128(v),
                (None, None) => serializer.serialize_str(&n.to_string()),
            },
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_are_classified() {
        assert_eq!(Value::from_json(&json!(1)).unwrap(), Value::Integer(1));
        assert_eq!(Value::from_json(&json!(-7)).unwrap(), Value::Integer(-7));
        assert_eq!(Value::from_json(&json!(1.0)).unwrap(), Value::Double(1.0));
        assert_eq!(Value::from_json(&json!(2.5)).unwrap(), Value::Double(2.5));

        let big: serde_json::Value =
            serde_json::from_str("123456789012345678901234567890").unwrap();
        let value = Value::from_json(&big).unwrap();
        assert_eq!(
            value,
            Value::big_integer("123456789012345678901234567890".parse().unwrap())
        );
    }

    #[test]
    fn documents_convert_both_ways() {
        let doc = json!({
            "pkey": "k1",
            "some_idx": 10,
            "ratio": 0.5,
            "flags": [true, null],
        });
        let value = Value::from_json(&doc).unwrap();
        assert_eq!(value.get("pkey"), Some(&Value::from("k1")));
        assert_eq!(value.get("some_idx"), Some(&Value::Integer(10)));
        assert_eq!(value.to_json().unwrap(), doc);
    }

    #[test]
    fn big_integers_survive_json() {
        let text = "-98765432109876543210987654321";
        let json: serde_json::Value = serde_json::from_str(text).unwrap();
        let value = Value::try_from(&json).unwrap();
        assert_eq!(value.to_json().unwrap().to_string(), text);
    }

    #[test]
    fn serialize_matches_to_json() {
        let value = Value::map([
            ("a", Value::Integer(1)),
            ("b", Value::Array(vec![Value::from("x"), Value::Null])),
        ]);
        let via_serde = serde_json::to_value(&value).unwrap();
        assert_eq!(via_serde, value.to_json().unwrap());
    }

    #[test]
    fn non_finite_double_has_no_json_form() {
        assert_eq!(
            Value::Double(f64::NAN).to_json(),
            Err(CodecError::NonFiniteForbidden)
        );
    }
}
