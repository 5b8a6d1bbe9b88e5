use crate::document::{self, Document};
use crate::store::{MemoryRuleStore, RuleId, RuleStore};
use crate::{Ast, Operator, Record, RuleError};

/// Creates, combines and evaluates rules on top of a [`RuleStore`].
///
/// This is the surface a network or CLI layer wraps: each method maps to one
/// request kind and returns a [`RuleError`] the caller can translate into a
/// response.
///
/// # Example
///
/// ```
/// use rule_ast::{Record, RuleEngine};
///
/// let engine = RuleEngine::in_memory();
/// let (id, _doc) = engine.create_rule("sales_seniors", "age > 30 AND department = 'Sales'").unwrap();
/// let record = Record::new().set("age", 35).set("department", "Sales");
/// assert!(engine.evaluate_rule(id, &record).unwrap());
/// ```
#[derive(Debug)]
pub struct RuleEngine<S = MemoryRuleStore> {
    store: S,
}

impl RuleEngine<MemoryRuleStore> {
    /// An engine backed by a fresh [`MemoryRuleStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryRuleStore::new())
    }
}

impl Default for RuleEngine<MemoryRuleStore> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: RuleStore> RuleEngine<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parse `text`, store its document under `name`, and return the new id
    /// with the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] for invalid rule text and
    /// [`RuleError::Store`] if the store rejects the write.
    pub fn create_rule(&self, name: &str, text: &str) -> Result<(RuleId, Document), RuleError> {
        let root = crate::parse::parse_rule(text)?;
        let doc = document::encode(&root);
        let id = self.store.put(name, doc.clone())?;
        tracing::debug!(%id, name, "created rule");
        Ok((id, doc))
    }

    /// Parse each rule and join them with `AND`. Nothing is stored.
    /// An empty list yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] for the first invalid rule.
    pub fn combine_rules<T: AsRef<str>>(&self, rules: &[T]) -> Result<Option<Document>, RuleError> {
        self.combine_rules_with(rules, Operator::And)
    }

    /// Like [`combine_rules`](Self::combine_rules) with an explicit joiner.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] for the first invalid rule.
    pub fn combine_rules_with<T: AsRef<str>>(
        &self,
        rules: &[T],
        joiner: Operator,
    ) -> Result<Option<Document>, RuleError> {
        let ast = Ast::combine(rules, joiner)?;
        tracing::debug!(rules = rules.len(), %joiner, "combined rules");
        Ok(ast.to_document())
    }

    /// Fetch a stored rule and rebuild its AST.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Store`] for an unknown id and
    /// [`RuleError::Document`] if the stored document is inconsistent.
    pub fn load_rule(&self, id: RuleId) -> Result<Ast, RuleError> {
        let stored = self.store.get(id)?;
        Ok(Ast::from_document(Some(&stored.document))?)
    }

    /// Evaluate a stored rule against a record.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Store`] for an unknown id, [`RuleError::Document`]
    /// for an inconsistent stored document, and [`RuleError::Eval`] for a
    /// missing field or type mismatch.
    pub fn evaluate_rule(&self, id: RuleId, record: &Record) -> Result<bool, RuleError> {
        let ast = self.load_rule(id)?;
        let result = ast.evaluate_rule(record).inspect_err(|e| {
            tracing::debug!(%id, error = %e, "evaluation failed");
        })?;
        tracing::debug!(%id, result, "evaluated rule");
        Ok(result)
    }
}
