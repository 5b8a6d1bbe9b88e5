mod error;
mod lexer;
mod parser;

pub use error::ParseError;
pub use lexer::{Token, tokenize};
pub use parser::Parser;

use crate::{MAX_DEPTH, Node, Operator};

/// Parse rule text into a tree.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not a valid rule.
pub fn parse_rule(text: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(text);
    let node = Parser::new(&tokens).parse().inspect_err(|e| {
        tracing::debug!(error = %e, "rule rejected");
    })?;
    tracing::debug!(
        tokens = tokens.len(),
        nodes = node.node_count(),
        "parsed rule"
    );
    Ok(node)
}

/// Parse each rule independently and fold them left to right with `joiner`.
///
/// Returns `Ok(None)` for an empty slice.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered, or
/// [`ParseError::CombinedTooDeep`] once the combined tree would grow deeper
/// than [`MAX_DEPTH`].
pub fn combine<S: AsRef<str>>(rules: &[S], joiner: Operator) -> Result<Option<Node>, ParseError> {
    let mut combined: Option<(Node, usize)> = None;
    for (index, rule) in rules.iter().enumerate() {
        let node = parse_rule(rule.as_ref())?;
        let depth = node.depth();
        combined = Some(match combined {
            None => (node, depth),
            Some((acc, acc_depth)) => {
                let joined = 1 + acc_depth.max(depth);
                if joined > MAX_DEPTH {
                    tracing::debug!(index, max = MAX_DEPTH, "combined rule too deep");
                    return Err(ParseError::CombinedTooDeep {
                        index,
                        max: MAX_DEPTH,
                    });
                }
                (Node::join(joiner, acc, node), joined)
            }
        });
    }
    Ok(combined.map(|(node, _)| node))
}
