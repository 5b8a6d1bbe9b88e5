use std::fmt;

use super::error::EvalError;
use super::node::{Node, Operator};
use super::record::Record;
use crate::document::{self, Document, DocumentError};
use crate::parse::ParseError;

/// An immutable rule tree, possibly empty.
///
/// Created by parsing rule text, by combining several rules, or by decoding a
/// stored document. Evaluation never mutates the tree, so an `Ast` can be
/// shared behind `Arc` and evaluated from many threads at once.
///
/// # Example
///
/// ```
/// use rule_ast::{Ast, Record};
///
/// let ast = Ast::create_rule("age > 30 AND department = 'Sales'").unwrap();
/// let record = Record::new().set("age", 35).set("department", "Sales");
/// assert!(ast.evaluate_rule(&record).unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    root: Option<Node>,
}

impl Ast {
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root: Some(root) }
    }

    /// An AST with no root. Evaluating it fails with [`EvalError::EmptyRule`].
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse rule text into an AST.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the text is not a valid rule.
    pub fn create_rule(text: &str) -> Result<Self, ParseError> {
        crate::parse::parse_rule(text).map(Self::new)
    }

    /// Parse each rule and fold them left to right with `joiner`.
    /// An empty slice gives an empty AST.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered.
    pub fn combine<S: AsRef<str>>(rules: &[S], joiner: Operator) -> Result<Self, ParseError> {
        crate::parse::combine(rules, joiner).map(|root| Self { root })
    }

    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    #[must_use]
    pub fn into_root(self) -> Option<Node> {
        self.root
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Evaluate the rule against a record.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::EmptyRule`] for an empty AST, otherwise the errors
    /// of [`evaluate`](crate::evaluate).
    pub fn evaluate_rule(&self, record: &Record) -> Result<bool, EvalError> {
        let root = self.root.as_ref().ok_or(EvalError::EmptyRule)?;
        crate::evaluate::evaluate(root, record)
    }

    /// The document form of this AST, or `None` when it is empty.
    #[must_use]
    pub fn to_document(&self) -> Option<Document> {
        self.root.as_ref().map(document::encode)
    }

    /// Rebuild an AST from an optional document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the document is inconsistent.
    pub fn from_document(doc: Option<&Document>) -> Result<Self, DocumentError> {
        let root = doc.map(document::decode).transpose()?;
        Ok(Self { root })
    }

    /// JSON text of the document form; `null` for an empty AST.
    ///
    /// # Errors
    ///
    /// Same as [`Document::to_json_string`].
    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        match self.to_document() {
            Some(doc) => doc.to_json_string(),
            None => Ok("null".to_owned()),
        }
    }

    /// # Errors
    ///
    /// Returns [`DocumentError`] on invalid JSON or an inconsistent document.
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        document::decode_json_str(text).map(|root| Self { root })
    }
}

impl From<Node> for Ast {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{root}"),
            None => f.write_str("<empty rule>"),
        }
    }
}
