use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::ComparisonType;

/// Scalar values a condition compares against.
///
/// Serialized untagged, so `30`, `30.5` and `"Sales"` in a document map to
/// `Int`, `Float` and `String` respectively. JSON has no NaN or infinity, so
/// a document holding a non-finite `Float` is refused when written (see
/// [`DocumentError::NonFinite`](crate::DocumentError::NonFinite)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
}

impl Value {
    /// Compare this value to another using the given comparison type.
    ///
    /// Returns `None` when one side is a number and the other a string. No
    /// coercion between the two kinds is attempted.
    #[must_use]
    pub fn compare(&self, op: ComparisonType, other: &Value) -> Option<bool> {
        let ord = self.partial_cmp_value(other)?;
        Some(match (op, ord) {
            (ComparisonType::Neq, ord) => ord != Some(Ordering::Equal),
            // NaN on either side: only `!=` holds
            (_, None) => false,
            (ComparisonType::Eq, Some(ord)) => ord == Ordering::Equal,
            (ComparisonType::Gt, Some(ord)) => ord == Ordering::Greater,
            (ComparisonType::Gte, Some(ord)) => ord != Ordering::Less,
            (ComparisonType::Lt, Some(ord)) => ord == Ordering::Less,
            (ComparisonType::Lte, Some(ord)) => ord != Ordering::Greater,
        })
    }

    /// Short name of the value's kind, used in type mismatch reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Interpret an unquoted rule literal: integers first, then finite floats,
    /// anything else stays a string.
    pub(crate) fn from_literal(text: &str) -> Value {
        if let Ok(i) = text.parse::<i64>() {
            return Value::Int(i);
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float(f),
            _ => Value::String(text.to_owned()),
        }
    }

    /// Outer `None` means the kinds are incomparable, inner `None` means NaN.
    #[allow(clippy::cast_precision_loss)]
    fn partial_cmp_value(&self, other: &Value) -> Option<Option<Ordering>> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Some(a.cmp(b))),
            (Value::Float(a), Value::Float(b)) => Some(a.partial_cmp(b)),
            (Value::Int(a), Value::Float(b)) => Some((*a as f64).partial_cmp(b)),
            (Value::Float(a), Value::Int(b)) => Some(a.partial_cmp(&(*b as f64))),
            (Value::String(a), Value::String(b)) => Some(Some(a.cmp(b))),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Renders the value as a rule literal: strings are single-quoted and floats
/// always keep a fractional part so they re-parse as floats.
///
/// Rule text has no escape for `'`, so a string containing one renders as
/// text that does not parse back. Non-finite floats render as `NaN` and `inf`,
/// which parse back as strings.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::String(v) => write!(f, "'{v}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_no_quote_escape() {
        assert_eq!(Value::from("O'Brien").to_string(), "'O'Brien'");
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from(42_i64), Value::Int(42));
        assert_eq!(Value::from(7_i32), Value::Int(7));
        assert_eq!(Value::from(2.5_f64), Value::Float(2.5));
        assert_eq!(Value::from("Sales"), Value::String("Sales".to_owned()));
        assert_eq!(
            Value::from("owned".to_owned()),
            Value::String("owned".to_owned())
        );
    }

    #[test]
    fn display_as_literal() {
        assert_eq!(Value::Int(30).to_string(), "30");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::String("Sales".into()).to_string(), "'Sales'");
    }

    #[test]
    fn literal_typing() {
        assert_eq!(Value::from_literal("30"), Value::Int(30));
        assert_eq!(Value::from_literal("-5"), Value::Int(-5));
        assert_eq!(Value::from_literal("2.5"), Value::Float(2.5));
        assert_eq!(Value::from_literal("1e3"), Value::Float(1000.0));
        assert_eq!(Value::from_literal("Sales"), Value::String("Sales".into()));
        assert_eq!(Value::from_literal("inf"), Value::String("inf".into()));
        assert_eq!(Value::from_literal("NaN"), Value::String("NaN".into()));
    }

    #[test]
    fn compare_int() {
        let a = Value::Int(10);
        let b = Value::Int(20);
        assert_eq!(a.compare(ComparisonType::Eq, &b), Some(false));
        assert_eq!(a.compare(ComparisonType::Neq, &b), Some(true));
        assert_eq!(a.compare(ComparisonType::Lt, &b), Some(true));
        assert_eq!(a.compare(ComparisonType::Lte, &b), Some(true));
        assert_eq!(a.compare(ComparisonType::Gt, &b), Some(false));
        assert_eq!(a.compare(ComparisonType::Gte, &b), Some(false));
        assert_eq!(a.compare(ComparisonType::Eq, &a), Some(true));
        assert_eq!(a.compare(ComparisonType::Gte, &a), Some(true));
        assert_eq!(a.compare(ComparisonType::Lte, &a), Some(true));
    }

    #[test]
    fn compare_int_float_cross_type() {
        let i = Value::Int(10);
        let f = Value::Float(10.0);
        assert_eq!(i.compare(ComparisonType::Eq, &f), Some(true));
        assert_eq!(f.compare(ComparisonType::Eq, &i), Some(true));
        let f2 = Value::Float(10.5);
        assert_eq!(i.compare(ComparisonType::Lt, &f2), Some(true));
        assert_eq!(f2.compare(ComparisonType::Gt, &i), Some(true));
    }

    #[test]
    fn compare_string() {
        let a = Value::String("Marketing".into());
        let b = Value::String("Sales".into());
        assert_eq!(a.compare(ComparisonType::Lt, &b), Some(true));
        assert_eq!(a.compare(ComparisonType::Eq, &b), Some(false));
        assert_eq!(a.compare(ComparisonType::Eq, &a), Some(true));
    }

    #[test]
    fn compare_nan_only_neq_holds() {
        let nan = Value::Float(f64::NAN);
        let one = Value::Int(1);
        assert_eq!(nan.compare(ComparisonType::Eq, &nan), Some(false));
        assert_eq!(nan.compare(ComparisonType::Gt, &one), Some(false));
        assert_eq!(nan.compare(ComparisonType::Lte, &one), Some(false));
        assert_eq!(nan.compare(ComparisonType::Neq, &nan), Some(true));
    }

    #[test]
    fn compare_type_mismatch_returns_none() {
        let i = Value::Int(1);
        let s = Value::String("1".into());
        assert_eq!(i.compare(ComparisonType::Eq, &s), None);
        assert_eq!(s.compare(ComparisonType::Gt, &Value::Float(0.5)), None);
    }

    #[test]
    fn untagged_json() {
        let v: Value = serde_json::from_str("30").unwrap();
        assert_eq!(v, Value::Int(30));
        let v: Value = serde_json::from_str("30.5").unwrap();
        assert_eq!(v, Value::Float(30.5));
        let v: Value = serde_json::from_str("\"Sales\"").unwrap();
        assert_eq!(v, Value::String("Sales".into()));
        assert_eq!(serde_json::to_string(&Value::Float(2.0)).unwrap(), "2.0");
    }
}
