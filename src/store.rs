use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;

/// Identifier assigned to a stored rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(u64);

impl RuleId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RuleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rule document together with the name and id it was stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRule {
    pub id: RuleId,
    pub name: String,
    pub document: Document,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rule {id} not found")]
    NotFound { id: RuleId },

    #[error("rule store backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Durable keyed storage for rule documents.
///
/// Implementations own their own concurrency control; the rule core never
/// locks anything itself.
pub trait RuleStore: Send + Sync {
    /// Store a document under `name` and return its new id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend rejects the write.
    fn put(&self, name: &str, document: Document) -> Result<RuleId, StoreError>;

    /// Fetch a previously stored rule.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    fn get(&self, id: RuleId) -> Result<StoredRule, StoreError>;
}

impl<S: RuleStore + ?Sized> RuleStore for std::sync::Arc<S> {
    fn put(&self, name: &str, document: Document) -> Result<RuleId, StoreError> {
        (**self).put(name, document)
    }

    fn get(&self, id: RuleId) -> Result<StoredRule, StoreError> {
        (**self).get(id)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) rules: BTreeMap<RuleId, StoredRule>,
    pub(crate) last_id: u64,
}

/// In-process [`RuleStore`]. Ids are assigned sequentially starting at 1.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    pub(crate) state: RwLock<StoreState>,
}

impl MemoryRuleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().rules.is_empty()
    }

    /// Ids and names of all stored rules, in id order.
    #[must_use]
    pub fn list(&self) -> Vec<(RuleId, String)> {
        self.state
            .read()
            .rules
            .values()
            .map(|r| (r.id, r.name.clone()))
            .collect()
    }
}

#[cfg(feature = "binary-cache")]
impl MemoryRuleStore {
    /// Snapshot every stored rule, plus the id counter, into a byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if a stored
    /// document is inconsistent or encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(&self.state.read())
    }

    /// Restore a store from bytes produced by [`to_bytes`](Self::to_bytes).
    /// New ids continue after the highest id ever assigned.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        let state = crate::serial::decode(bytes)?;
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_file(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl RuleStore for MemoryRuleStore {
    fn put(&self, name: &str, document: Document) -> Result<RuleId, StoreError> {
        let mut state = self.state.write();
        state.last_id += 1;
        let id = RuleId(state.last_id);
        state.rules.insert(
            id,
            StoredRule {
                id,
                name: name.to_owned(),
                document,
            },
        );
        tracing::debug!(%id, name, "stored rule");
        Ok(id)
    }

    fn get(&self, id: RuleId) -> Result<StoredRule, StoreError> {
        self.state
            .read()
            .rules
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }
}
