//! Property-based test generators using proptest.
//!
//! Provides strategies for generating names, key values and records that
//! contracts accept.

use proptest::prelude::*;
use tabledger_codec::Value;
use tabledger_core::KeyType;

/// Strategy for generating valid table and column names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating strings that are not valid names.
pub fn invalid_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        prop::string::string_regex("[0-9_][a-zA-Z0-9_]{0,8}").expect("Invalid regex"),
        prop::string::string_regex("[a-z]{1,4}[:\\- .][a-z]{0,4}").expect("Invalid regex"),
    ]
}

/// Strategy for generating finite doubles.
pub fn finite_double_strategy() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |d| d.is_finite())
}

/// Strategy for generating numeric values in any representation.
pub fn number_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        finite_double_strategy().prop_map(Value::Double),
        (any::<i64>(), 1u32..4).prop_map(|(n, shift)| {
            let big = num_scale(n, shift);
            Value::from_json(&serde_json::from_str(&big).expect("Invalid number"))
                .expect("Invalid number")
        }),
    ]
}

// Decimal text of n * 10^(20 * shift), always outside the i64 range unless n is 0.
fn num_scale(n: i64, shift: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    format!("{n}{}", "0".repeat(20 * shift as usize))
}

/// Strategy for generating a key value of `key_type`.
pub fn key_value_strategy(key_type: KeyType) -> BoxedStrategy<Value> {
    match key_type {
        KeyType::String => "[a-zA-Z0-9_]{1,12}".prop_map(Value::Text).boxed(),
        KeyType::Number => number_strategy().boxed(),
        KeyType::Boolean => any::<bool>().prop_map(Value::Bool).boxed(),
    }
}

/// Strategy for generating any scalar value.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        key_value_strategy(KeyType::String),
        key_value_strategy(KeyType::Number),
        key_value_strategy(KeyType::Boolean),
    ]
}

/// Strategy for generating records of the example table.
///
/// Records are keyed by a string `pkey`, carry a small integer `some_idx`
/// and a free-form `col`.
pub fn example_record_strategy() -> impl Strategy<Value = serde_json::Value> {
    ("k[0-9]{1,3}", 0i64..5, "[a-z]{0,6}").prop_map(|(pkey, some_idx, col)| {
        serde_json::json!({"pkey": pkey, "some_idx": some_idx, "col": col})
    })
}
