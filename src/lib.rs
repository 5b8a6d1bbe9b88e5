//! Boolean rules over named attributes.
//!
//! Rule text such as `age > 30 AND department = 'Sales'` is tokenized, parsed
//! into an [`Ast`], and evaluated against a [`Record`]. Trees convert to and
//! from a JSON [`Document`] for storage, and [`RuleEngine`] ties parsing,
//! storage and evaluation together over a [`RuleStore`].

mod engine;
mod error;
mod evaluate;
mod types;

pub mod document;
pub mod parse;
#[cfg(feature = "binary-cache")]
pub mod serial;
pub mod store;

pub use document::{Document, DocumentError, decode, encode};
pub use engine::RuleEngine;
pub use error::RuleError;
pub use evaluate::evaluate;
pub use parse::{ParseError, Parser, Token, combine, parse_rule, tokenize};
pub use store::{MemoryRuleStore, RuleId, RuleStore, StoreError, StoredRule};
pub use types::{
    Ast, ComparisonType, Condition, EvalError, FieldExpr, MAX_DEPTH, Node, Operator, Record,
    RecordError, Value, field,
};

#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
