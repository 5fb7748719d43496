//! Key-text test vectors.
//!
//! Asset ids embed key values as text, and every replica must produce the
//! same text for the same value. These vectors pin that text down.

use serde::{Deserialize, Serialize};

/// A key value and the asset id text it must produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTextVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// The value as JSON source text.
    pub input_json: String,
    /// Expected key text, or `None` for the null bucket.
    pub expected: Option<String>,
}

fn vector(id: &str, description: &str, input_json: &str, expected: Option<&str>) -> KeyTextVector {
    KeyTextVector {
        id: id.into(),
        description: description.into(),
        input_json: input_json.into(),
        expected: expected.map(Into::into),
    }
}

/// Key-text vectors covering every scalar form.
pub fn key_text_vectors() -> Vec<KeyTextVector> {
    vec![
        vector("text", "Text is used unchanged", "\"k1\"", Some("k1")),
        vector("text_with_colon", "Text is not escaped", "\"a:b\"", Some("a:b")),
        vector("int_zero", "Integer zero", "0", Some("0")),
        vector("int_negative", "Negative integer", "-42", Some("-42")),
        vector("int_max", "Largest i64", "9223372036854775807", Some("9223372036854775807")),
        vector(
            "bigint",
            "Integer beyond i64 keeps every digit",
            "123456789012345678901234567890",
            Some("123456789012345678901234567890"),
        ),
        vector(
            "bigint_negative",
            "Negative integer beyond i64",
            "-98765432109876543210",
            Some("-98765432109876543210"),
        ),
        vector("double_integral", "Integral double drops the fraction", "1.0", Some("1")),
        vector("double_exponent", "Exponent form becomes plain digits", "1e3", Some("1000")),
        vector("double_fraction", "Non-integral double", "0.25", Some("0.25")),
        vector("double_negative_zero", "Negative zero folds to zero", "-0.0", Some("0")),
        vector("double_small", "Small double has no exponent", "1e-7", Some("0.0000001")),
        vector("bool_true", "Boolean true", "true", Some("true")),
        vector("bool_false", "Boolean false", "false", Some("false")),
        vector("null", "Null has no key text", "null", None),
    ]
}

/// Returns every vector as a JSON document.
///
/// # Panics
///
/// Panics if the vectors cannot be serialized.
pub fn key_text_vectors_json() -> String {
    serde_json::to_string_pretty(&key_text_vectors()).expect("Failed to serialize vectors")
}
