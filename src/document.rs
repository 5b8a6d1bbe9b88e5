//! Structured document form of a rule tree, used for storage and exchange.
//!
//! ## Shape
//!
//! ```text
//! { "node_type": "operand" | "operator",
//!   "left":  Document | null,
//!   "right": Document | null,
//!   "value": { "lvariable", "rvalue", "comparison_type" } | "ANDOperator" | "OROperator" | null }
//! ```
//!
//! Field names and tag literals are the persisted contract; documents written
//! by earlier deployments decode unchanged. An empty tree has no document and
//! is written as JSON `null`.

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use thiserror::Error;

use crate::{Condition, MAX_DEPTH, Node, Operator, Value};

/// Errors produced when writing a document as JSON or turning one back into a
/// tree.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {reason}")]
    Malformed { reason: String },

    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document nests {depth} levels deep, more than the {max} that can be read back")]
    TooDeep { depth: usize, max: usize },

    #[error("condition on '{field}' compares against a non-finite float")]
    NonFinite { field: String },
}

impl DocumentError {
    fn malformed(reason: impl Into<String>) -> Self {
        DocumentError::Malformed {
            reason: reason.into(),
        }
    }

    // Shape errors from serde are consistency failures, not JSON syntax.
    fn from_serde(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => DocumentError::malformed(err.to_string()),
            _ => DocumentError::Json(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Operand,
    Operator,
}

/// Payload of a document node: a condition for operands, a tag for operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    Condition(Condition),
    Operator(Operator),
}

/// One node of the document form. Children are `null` on operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub node_type: NodeType,
    #[serde(default)]
    pub left: Option<Box<Document>>,
    #[serde(default)]
    pub right: Option<Box<Document>>,
    #[serde(default)]
    pub value: Option<NodeValue>,
}

impl Document {
    /// Parse a single document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Json`] on invalid JSON and
    /// [`DocumentError::Malformed`] when the JSON does not have the document
    /// shape.
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(text).map_err(DocumentError::from_serde)
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] when the value does not have the
    /// document shape.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        serde_json::from_value(value).map_err(DocumentError::from_serde)
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::TooDeep`] or [`DocumentError::NonFinite`] for a
    /// document whose JSON could not be read back, and [`DocumentError::Json`]
    /// if serialization fails.
    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        self.check_writable()?;
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Same as [`to_json_string`](Self::to_json_string).
    pub fn to_json_value(&self) -> Result<serde_json::Value, DocumentError> {
        self.check_writable()?;
        Ok(serde_json::to_value(self)?)
    }

    /// Nesting depth of this document; a lone operand has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((doc, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(doc.children().map(|child| (child, depth + 1)));
        }
        deepest
    }

    fn children(&self) -> impl Iterator<Item = &Document> {
        self.left.as_deref().into_iter().chain(self.right.as_deref())
    }

    // JSON has no NaN or infinity (serde_json writes `null`) and the reader
    // stops at 128 levels, so both would produce text that fails to decode.
    fn check_writable(&self) -> Result<(), DocumentError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(DocumentError::TooDeep {
                depth,
                max: MAX_DEPTH,
            });
        }
        let mut stack = vec![self];
        while let Some(doc) = stack.pop() {
            if let Some(NodeValue::Condition(cond)) = &doc.value {
                if matches!(cond.rvalue, Value::Float(v) if !v.is_finite()) {
                    return Err(DocumentError::NonFinite {
                        field: cond.lvariable.clone(),
                    });
                }
            }
            stack.extend(doc.children());
        }
        Ok(())
    }
}

/// Convert a tree to its document form.
#[must_use]
pub fn encode(node: &Node) -> Document {
    match node {
        Node::Operand(cond) => Document {
            node_type: NodeType::Operand,
            left: None,
            right: None,
            value: Some(NodeValue::Condition(cond.clone())),
        },
        Node::Operator { op, left, right } => Document {
            node_type: NodeType::Operator,
            left: Some(Box::new(encode(left))),
            right: Some(Box::new(encode(right))),
            value: Some(NodeValue::Operator(*op)),
        },
    }
}

/// Convert a document back into a tree, checking that every node's
/// `node_type` agrees with its populated fields.
///
/// # Errors
///
/// Returns [`DocumentError::Malformed`] on the first inconsistent node.
pub fn decode(doc: &Document) -> Result<Node, DocumentError> {
    match doc.node_type {
        NodeType::Operand => {
            if doc.left.is_some() || doc.right.is_some() {
                return Err(DocumentError::malformed("operand node has children"));
            }
            match &doc.value {
                Some(NodeValue::Condition(cond)) => Ok(Node::Operand(cond.clone())),
                Some(NodeValue::Operator(op)) => Err(DocumentError::malformed(format!(
                    "operand node carries operator tag '{op}'"
                ))),
                None => Err(DocumentError::malformed("operand node has no condition")),
            }
        }
        NodeType::Operator => {
            let op = match &doc.value {
                Some(NodeValue::Operator(op)) => *op,
                Some(NodeValue::Condition(_)) => {
                    return Err(DocumentError::malformed(
                        "operator node carries a condition",
                    ));
                }
                None => return Err(DocumentError::malformed("operator node has no operator tag")),
            };
            let (Some(left), Some(right)) = (doc.left.as_deref(), doc.right.as_deref()) else {
                return Err(DocumentError::malformed(format!(
                    "{op} node is missing a child"
                )));
            };
            Ok(Node::join(op, decode(left)?, decode(right)?))
        }
    }
}

/// Parse stored JSON text into a tree. `null` and blank text are the empty
/// tree.
///
/// # Errors
///
/// Returns [`DocumentError`] on invalid JSON or an inconsistent document.
pub fn decode_json_str(text: &str) -> Result<Option<Node>, DocumentError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let doc: Option<Document> = serde_json::from_str(text).map_err(DocumentError::from_serde)?;
    doc.as_ref().map(decode).transpose()
}

impl From<&Node> for Document {
    fn from(node: &Node) -> Self {
        encode(node)
    }
}

impl TryFrom<&Document> for Node {
    type Error = DocumentError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        decode(doc)
    }
}
