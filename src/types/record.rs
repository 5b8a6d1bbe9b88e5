use std::collections::HashMap;

use super::error::RecordError;
use super::Value;

/// Attribute values a rule is evaluated against.
///
/// Names are flat: `"user.age"` is a single attribute, not a nested path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    data: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Insert an attribute (mutable reference version).
    pub fn insert(&mut self, name: &str, value: Value) {
        self.data.insert(name.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Build a record from a JSON object of scalar attributes.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotAnObject`] if `json` is not an object, and
    /// [`RecordError::UnsupportedValue`] for booleans, nulls, arrays, nested
    /// objects, or numbers outside the `i64`/`f64` range.
    pub fn from_json(json: serde_json::Value) -> Result<Self, RecordError> {
        let serde_json::Value::Object(map) = json else {
            return Err(RecordError::NotAnObject);
        };
        let mut record = Record::new();
        for (name, value) in map {
            let value = match value {
                serde_json::Value::String(s) => Value::String(s),
                serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                    (Some(i), _) => Value::Int(i),
                    (None, Some(f)) => Value::Float(f),
                    (None, None) => return Err(unsupported(name, "number")),
                },
                serde_json::Value::Bool(_) => return Err(unsupported(name, "boolean")),
                serde_json::Value::Null => return Err(unsupported(name, "null")),
                serde_json::Value::Array(_) => return Err(unsupported(name, "array")),
                serde_json::Value::Object(_) => return Err(unsupported(name, "object")),
            };
            record.data.insert(name, value);
        }
        Ok(record)
    }
}

fn unsupported(field: String, kind: &'static str) -> RecordError {
    RecordError::UnsupportedValue { field, kind }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = RecordError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Record::from_json(json)
    }
}
