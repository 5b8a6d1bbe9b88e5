use thiserror::Error;

/// Errors produced when evaluating a rule against a [`Record`](super::Record).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("field '{field}' is missing from the record")]
    MissingField { field: String },

    #[error("type mismatch on field '{field}': rule compares against a {expected}, record holds a {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("rule is empty; there is nothing to evaluate")]
    EmptyRule,
}

/// Errors produced when building a [`Record`](super::Record) from JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record must be a JSON object")]
    NotAnObject,

    #[error("field '{field}' holds an unsupported {kind}; only numbers and strings are allowed")]
    UnsupportedValue { field: String, kind: &'static str },
}
