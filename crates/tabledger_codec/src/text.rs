//! Canonical key text for scalar values.
//!
//! Asset identifiers embed key values as text, and the same identifier must
//! be produced by every node that executes a contract. This module is the
//! single place where a scalar becomes that text.
//!
//! | Value | Key text |
//! |-------|----------|
//! | `Text(s)` | `s` unchanged |
//! | `Integer(n)` / `BigInteger(n)` | decimal digits |
//! | `Double(d)` integral | decimal digits of the integer (`1.0` → `1`) |
//! | `Double(d)` otherwise | shortest plain decimal (`0.25`) |
//! | `Bool(b)` | `true` / `false` |
//! | `Null`, arrays, maps | no key text |

use crate::value::Value;

/// Returns the canonical key text of a scalar value.
///
/// Returns `None` for null and for non-scalar values; callers route null to
/// the null variant of an identifier and reject containers during validation.
///
/// # Example
///
/// ```
/// use tabledger_codec::{key_text, Value};
///
/// assert_eq!(key_text(&Value::Integer(1)), Some("1".to_string()));
/// assert_eq!(key_text(&Value::Double(1.0)), Some("1".to_string()));
/// assert_eq!(key_text(&Value::Null), None);
/// ```
pub fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(n) => Some(n.to_string()),
        Value::BigInteger(n) => Some(n.to_string()),
        Value::Double(d) => Some(double_text(*d)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Map(_) => None,
    }
}

// f64's Display never uses exponent notation and prints integral values
// without a fractional part, which is exactly the plain decimal form needed.
fn double_text(d: f64) -> String {
    if d == 0.0 {
        // folds -0.0 into 0
        return "0".to_string();
    }
    format!("{d}")
}
