mod ast;
mod error;
mod node;
mod record;
mod value;

pub use ast::Ast;
pub use error::{EvalError, RecordError};
pub use node::{ComparisonType, Condition, FieldExpr, MAX_DEPTH, Node, Operator, field};
pub use record::Record;
pub use value::Value;
