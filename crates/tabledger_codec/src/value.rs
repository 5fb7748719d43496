//! Dynamic document value type.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A dynamic document value.
///
/// Every argument, record, index delta and table definition handled by
/// tabledger is a tree of `Value`s. The scalar variants are closed: a number
/// is always one of [`Value::Integer`], [`Value::BigInteger`] or
/// [`Value::Double`], never an untyped node inspected at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (full i64 range).
    Integer(i64),
    /// Arbitrary-precision integer outside the i64 range.
    ///
    /// Build with [`Value::big_integer`] so that values fitting in an `i64`
    /// stay [`Value::Integer`].
    BigInteger(BigInt),
    /// Finite double-precision number.
    Double(f64),
    /// Text string (UTF-8).
    Text(String),
    /// Array of values.
    Array(Vec<Value>),
    /// Map of named fields, iterated in key order.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Create a map value from field pairs.
    ///
    /// Later pairs replace earlier pairs with the same key.
    pub fn map<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create an integer value, narrowing to [`Value::Integer`] when it fits.
    pub fn big_integer(n: BigInt) -> Self {
        match i64::try_from(&n) {
            Ok(small) => Value::Integer(small),
            Err(_) => Value::BigInteger(n),
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) | Value::BigInteger(_) | Value::Double(_) => "number",
            Value::Text(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is any numeric variant.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Integer(_) | Value::BigInteger(_) | Value::Double(_)
        )
    }

    /// Check if this value is a text, number or boolean.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Text(_)) || self.is_number()
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is a [`Value::Integer`].
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a text string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a field in this map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Compare two numeric values by magnitude.
    ///
    /// Integers, big integers and doubles compare exactly against each other,
    /// so `Integer(1)` equals `Double(1.0)`. Returns `None` if either side is
    /// not a number.
    pub fn cmp_numeric(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Double(d), other) => other.cmp_exact_with_double(*d).map(Ordering::reverse),
            (this, Value::Double(d)) => this.cmp_exact_with_double(*d),
            (a, b) => Some(a.to_exact_integer()?.cmp(&b.to_exact_integer()?)),
        }
    }

    fn to_exact_integer(&self) -> Option<BigInt> {
        match self {
            Value::Integer(n) => Some(BigInt::from(*n)),
            Value::BigInteger(n) => Some(n.clone()),
            _ => None,
        }
    }

    // self is an Integer or BigInteger; d is compared exactly through its floor.
    fn cmp_exact_with_double(&self, d: f64) -> Option<Ordering> {
        let n = self.to_exact_integer()?;
        if !d.is_finite() {
            return n.to_f64()?.partial_cmp(&d);
        }
        let floor = BigInt::from_f64(d.floor())?;
        if d.fract() == 0.0 {
            return Some(n.cmp(&floor));
        }
        // floor < d < floor + 1
        if n <= floor {
            Some(Ordering::Less)
        } else {
            Some(Ordering::Greater)
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::big_integer(BigInt::from(n))
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::big_integer(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}
