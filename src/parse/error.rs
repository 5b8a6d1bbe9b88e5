use thiserror::Error;

/// Errors produced when parsing rule text.
///
/// Positions are indices into the token sequence produced by
/// [`tokenize`](super::tokenize).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error: unexpected end of rule, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("syntax error: unexpected token '{found}' at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        position: usize,
        expected: &'static str,
    },

    #[error("syntax error: unknown comparator '{found}' at position {position}")]
    UnknownComparator { found: String, position: usize },

    #[error("syntax error: '(' at position {position} is never closed")]
    UnmatchedParen { position: usize },

    #[error("syntax error: unexpected trailing token '{found}' at position {position}")]
    TrailingTokens { found: String, position: usize },

    #[error("syntax error: rule nests deeper than {max} levels at position {position}")]
    TooDeep { max: usize, position: usize },

    #[error("syntax error: joining rule {index} would nest the combined rule deeper than {max} levels")]
    CombinedTooDeep { index: usize, max: usize },
}
