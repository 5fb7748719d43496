//! Scan conditions and their evaluation.

use crate::error::{ContractError, ContractResult, ErrorCode};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tabledger_codec::Value;

const COLUMN: &str = "column";
const OPERATOR: &str = "operator";
const VALUE: &str = "value";

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `is_null`: the field is absent or null.
    IsNull,
    /// `is_not_null`: the field is present and not null.
    IsNotNull,
}

impl Operator {
    /// Returns the textual form used in arguments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
        }
    }

    /// Returns true if the operator compares against a value.
    #[must_use]
    pub const fn takes_value(self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
            Self::IsNull | Self::IsNotNull => false,
        }
    }
}

impl FromStr for Operator {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            "is_null" => Ok(Self::IsNull),
            "is_not_null" => Ok(Self::IsNotNull),
            _ => Err(ContractError::with_detail(ErrorCode::InvalidOperator, s)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{column, operator, value?}` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column the condition tests.
    pub column: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Operand; present exactly when the operator takes one.
    pub value: Option<Value>,
}

impl Condition {
    /// Creates a condition.
    pub fn new(column: impl Into<String>, operator: Operator, value: Option<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }

    /// Parses a condition document.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_OPERATOR` for an unknown operator and
    /// `INVALID_CONDITION_FORMAT` for any other shape problem, including a
    /// missing or non-scalar operand for a comparison and an operand given
    /// to `is_null`/`is_not_null`.
    pub fn parse(document: &Value) -> ContractResult<Self> {
        let format = || ContractError::new(ErrorCode::InvalidConditionFormat);
        let fields = document.as_map().ok_or_else(format)?;
        if fields
            .keys()
            .any(|key| !matches!(key.as_str(), COLUMN | OPERATOR | VALUE))
        {
            return Err(format());
        }

        let column = fields.get(COLUMN).and_then(Value::as_text).ok_or_else(format)?;
        let operator: Operator = fields
            .get(OPERATOR)
            .and_then(Value::as_text)
            .ok_or_else(format)?
            .parse()?;

        let value = match (operator.takes_value(), fields.get(VALUE)) {
            (true, Some(value)) if value.is_scalar() => Some(value.clone()),
            (false, None) => None,
            _ => return Err(format()),
        };

        Ok(Self::new(column, operator, value))
    }

    /// Parses a condition array.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_CONDITION_FORMAT` if `document` is not an array, or
    /// the first error from [`Condition::parse`].
    pub fn parse_all(document: &Value) -> ContractResult<Vec<Self>> {
        document
            .as_array()
            .ok_or(ContractError::new(ErrorCode::InvalidConditionFormat))?
            .iter()
            .map(Self::parse)
            .collect()
    }

    /// Returns the document form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = vec![
            (COLUMN, Value::from(self.column.as_str())),
            (OPERATOR, Value::from(self.operator.as_str())),
        ];
        if let Some(value) = &self.value {
            fields.push((VALUE, value.clone()));
        }
        Value::map(fields)
    }

    /// Evaluates the condition against a record.
    ///
    /// Strings compare lexicographically and numbers by magnitude whatever
    /// their representation. Booleans support only `=` and `!=`. A field of
    /// a different type than the operand never matches.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        let field = record.get(&self.column).filter(|v| !v.is_null());
        match (self.operator, field, &self.value) {
            (Operator::IsNull, field, _) => field.is_none(),
            (Operator::IsNotNull, field, _) => field.is_some(),
            (op, Some(field), Some(operand)) => compare(op, field, operand),
            _ => false,
        }
    }
}

fn compare(op: Operator, field: &Value, operand: &Value) -> bool {
    let ordering = match (field, operand) {
        (Value::Text(a), Value::Text(b)) => a.as_str().cmp(b.as_str()),
        (Value::Bool(a), Value::Bool(b)) => {
            return match op {
                Operator::Eq => a == b,
                Operator::Ne => a != b,
                _ => false,
            }
        }
        (a, b) if a.is_number() && b.is_number() => match a.cmp_numeric(b) {
            Some(ordering) => ordering,
            None => return false,
        },
        _ => return false,
    };
    op.accepts(ordering)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(column: &str, op: &str, value: Option<Value>) -> Value {
        let mut fields = vec![("column", Value::from(column)), ("operator", Value::from(op))];
        if let Some(value) = value {
            fields.push(("value", value));
        }
        Value::map(fields)
    }

    fn record() -> Value {
        Value::map([
            ("pkey", Value::from("k1")),
            ("n", Value::Integer(10)),
            ("ratio", Value::Double(0.5)),
            ("flag", Value::Bool(true)),
            ("empty", Value::Null),
        ])
    }

    fn eval(column: &str, op: &str, value: Option<Value>) -> bool {
        Condition::parse(&cond(column, op, value)).unwrap().matches(&record())
    }

    #[test]
    fn parse_operators_case_insensitively() {
        let parsed = Condition::parse(&cond("a", "IS_NULL", None)).unwrap();
        assert_eq!(parsed.operator, Operator::IsNull);
        assert_eq!(parsed.value, None);
    }

    #[test]
    fn parse_rejects_unknown_operator() {
        let err = Condition::parse(&cond("a", "like", Some(Value::from("x")))).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidOperator));
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        let bad = [
            Value::from("a = 1"),
            cond("a", "=", None),
            cond("a", "is_null", Some(Value::Integer(1))),
            cond("a", "=", Some(Value::Null)),
            cond("a", "=", Some(Value::Array(vec![]))),
            Value::map([("column", Value::Integer(1)), ("operator", Value::from("="))]),
            Value::map([
                ("column", Value::from("a")),
                ("operator", Value::from("=")),
                ("value", Value::Integer(1)),
                ("extra", Value::Null),
            ]),
        ];
        for doc in bad {
            let err = Condition::parse(&doc).unwrap_err();
            assert_eq!(err.code(), Some(ErrorCode::InvalidConditionFormat), "{doc:?}");
        }
        assert!(Condition::parse_all(&Value::Null).is_err());
    }

    #[test]
    fn parse_to_value_roundtrip() {
        let doc = cond("n", ">=", Some(Value::Integer(3)));
        assert_eq!(Condition::parse(&doc).unwrap().to_value(), doc);
    }

    #[test]
    fn string_comparisons_are_lexicographic() {
        assert!(eval("pkey", "=", Some(Value::from("k1"))));
        assert!(eval("pkey", "<", Some(Value::from("k2"))));
        assert!(eval("pkey", ">", Some(Value::from("k"))));
        assert!(!eval("pkey", "!=", Some(Value::from("k1"))));
    }

    #[test]
    fn numeric_comparisons_ignore_representation() {
        assert!(eval("n", "=", Some(Value::Double(10.0))));
        assert!(eval("n", ">", Some(Value::Double(9.5))));
        assert!(eval("n", "<=", Some(Value::Integer(10))));
        assert!(eval("ratio", "<", Some(Value::Integer(1))));
        assert!(eval("ratio", ">=", Some(Value::Double(0.5))));
    }

    #[test]
    fn booleans_support_only_equality() {
        assert!(eval("flag", "=", Some(Value::Bool(true))));
        assert!(eval("flag", "!=", Some(Value::Bool(false))));
        assert!(!eval("flag", ">", Some(Value::Bool(false))));
        assert!(!eval("flag", "<=", Some(Value::Bool(true))));
    }

    #[test]
    fn type_mismatch_never_matches() {
        assert!(!eval("n", "=", Some(Value::from("10"))));
        assert!(!eval("n", "!=", Some(Value::from("10"))));
        assert!(!eval("pkey", "!=", Some(Value::Integer(1))));
    }

    #[test]
    fn null_tests() {
        assert!(eval("empty", "is_null", None));
        assert!(eval("missing", "is_null", None));
        assert!(!eval("n", "is_null", None));
        assert!(eval("n", "is_not_null", None));
        assert!(!eval("empty", "is_not_null", None));
        assert!(!eval("missing", "=", Some(Value::Integer(1))));
    }
}
