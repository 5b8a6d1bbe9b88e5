use crate::{Condition, EvalError, Node, Record};

/// Evaluate a tree against a record.
///
/// Both children of an operator node are always evaluated, so a missing field
/// or type mismatch anywhere in the tree is reported regardless of the values
/// of its siblings.
///
/// # Errors
///
/// Returns [`EvalError::MissingField`] if a condition names an attribute the
/// record lacks, and [`EvalError::TypeMismatch`] if a condition compares a
/// number with a string.
pub fn evaluate(node: &Node, record: &Record) -> Result<bool, EvalError> {
    match node {
        Node::Operand(cond) => eval_condition(cond, record),
        Node::Operator { op, left, right } => {
            let left = evaluate(left, record)?;
            let right = evaluate(right, record)?;
            Ok(op.apply(left, right))
        }
    }
}

fn eval_condition(cond: &Condition, record: &Record) -> Result<bool, EvalError> {
    let actual = record
        .get(&cond.lvariable)
        .ok_or_else(|| EvalError::MissingField {
            field: cond.lvariable.clone(),
        })?;
    actual
        .compare(cond.comparison_type, &cond.rvalue)
        .ok_or_else(|| EvalError::TypeMismatch {
            field: cond.lvariable.clone(),
            expected: cond.rvalue.kind(),
            found: actual.kind(),
        })
}
