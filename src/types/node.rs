use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Value;

/// Relational operator attached to a [`Condition`].
///
/// Serialized as the short lowercase tag (`"gt"`, `"lt"`, `"eq"`, `"gte"`,
/// `"lte"`, `"neq"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonType {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
    Neq,
}

impl ComparisonType {
    /// The rule-text symbol for this comparison.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonType::Gt => ">",
            ComparisonType::Lt => "<",
            ComparisonType::Eq => "=",
            ComparisonType::Gte => ">=",
            ComparisonType::Lte => "<=",
            ComparisonType::Neq => "!=",
        }
    }
}

impl FromStr for ComparisonType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(ComparisonType::Gt),
            "<" => Ok(ComparisonType::Lt),
            "=" => Ok(ComparisonType::Eq),
            ">=" => Ok(ComparisonType::Gte),
            "<=" => Ok(ComparisonType::Lte),
            "!=" => Ok(ComparisonType::Neq),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean connective of an operator node.
///
/// The serialized tags match the documents stored by earlier deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "ANDOperator")]
    And,
    #[serde(rename = "OROperator")]
    Or,
}

impl Operator {
    #[must_use]
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Operator::And => left && right,
            Operator::Or => left || right,
        }
    }

    /// The rule-text keyword for this operator.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single attribute comparison: `lvariable comparison_type rvalue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub lvariable: String,
    pub rvalue: Value,
    pub comparison_type: ComparisonType,
}

impl Condition {
    pub fn new(
        lvariable: impl Into<String>,
        comparison_type: ComparisonType,
        rvalue: impl Into<Value>,
    ) -> Self {
        Self {
            lvariable: lvariable.into(),
            rvalue: rvalue.into(),
            comparison_type,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.lvariable, self.comparison_type, self.rvalue
        )
    }
}

/// Deepest tree (counted as in [`Node::depth`]) that parsing, combining and
/// JSON writing accept. Its JSON form stays inside serde_json's default
/// nesting limit, so every tree written can be read back.
pub const MAX_DEPTH: usize = 100;

/// A rule tree node. Operator nodes own both children; there is no sharing.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Operand(Condition),
    Operator {
        op: Operator,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    #[must_use]
    pub fn join(op: Operator, left: Node, right: Node) -> Node {
        Node::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn and(self, other: Node) -> Node {
        Node::join(Operator::And, self, other)
    }

    #[must_use]
    pub fn or(self, other: Node) -> Node {
        Node::join(Operator::Or, self, other)
    }

    /// Number of nodes in the tree rooted here.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Node::Operand(_) => 1,
            Node::Operator { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Depth of the tree rooted here; a lone operand has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Node::Operand(_) => 1,
            Node::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Conditions in left-to-right order.
    #[must_use]
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        collect_conditions(self, &mut out);
        out
    }
}

fn collect_conditions<'a>(node: &'a Node, out: &mut Vec<&'a Condition>) {
    match node {
        Node::Operand(cond) => out.push(cond),
        Node::Operator { left, right, .. } => {
            collect_conditions(left, out);
            collect_conditions(right, out);
        }
    }
}

impl From<Condition> for Node {
    fn from(cond: Condition) -> Self {
        Node::Operand(cond)
    }
}

/// Fully parenthesized rule text.
///
/// The rule language has no escapes, so the text parses back into an equal
/// tree only when every field name is a single plain word (no whitespace,
/// parentheses or `'`, and not `AND`/`OR`), no string value contains `'`, and
/// every float is finite.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Operand(cond) => write!(f, "{cond}"),
            Node::Operator { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

/// Intermediate builder for condition nodes.
/// Created by [`field()`]; requires a comparison method to produce a [`Node`].
#[derive(Debug, Clone)]
pub struct FieldExpr {
    name: String,
}

impl FieldExpr {
    fn compare(self, comparison_type: ComparisonType, value: impl Into<Value>) -> Node {
        Node::Operand(Condition::new(self.name, comparison_type, value))
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Node {
        self.compare(ComparisonType::Gt, value)
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Node {
        self.compare(ComparisonType::Lt, value)
    }

    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Node {
        self.compare(ComparisonType::Eq, value)
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Node {
        self.compare(ComparisonType::Gte, value)
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Node {
        self.compare(ComparisonType::Lte, value)
    }

    #[must_use]
    pub fn neq(self, value: impl Into<Value>) -> Node {
        self.compare(ComparisonType::Neq, value)
    }
}

#[must_use]
pub fn field(name: &str) -> FieldExpr {
    FieldExpr {
        name: name.to_owned(),
    }
}
