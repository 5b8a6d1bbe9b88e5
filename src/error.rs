use thiserror::Error;

use crate::document::DocumentError;
use crate::parse::ParseError;
use crate::store::StoreError;
use crate::{EvalError, RecordError};

/// Unified error type covering parsing, evaluation, documents and storage.
///
/// Returned by the [`RuleEngine`](crate::RuleEngine) methods. Each variant
/// corresponds to one failure kind a caller maps to a response: `Parse`,
/// `Eval`, `Record` and `Document` are caller errors, `Store` carries
/// not-found and backend failures.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}

impl RuleError {
    /// Whether the error was caused by the caller's input rather than by a
    /// missing rule or a storage failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RuleError::Parse(_) | RuleError::Eval(_) | RuleError::Record(_)
        )
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuleError::Store(StoreError::NotFound { .. }))
    }
}
