use std::fmt;

use winnow::combinator::{alt, opt, preceded, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::take_while;

/// A lexical token. Quoted literals keep their text without the quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'i> {
    LParen,
    RParen,
    /// A `'`-delimited literal.
    Quoted(&'i str),
    /// Any other run of non-whitespace, non-parenthesis characters: keywords,
    /// comparators, identifiers and unquoted literals.
    Word(&'i str),
}

impl<'i> Token<'i> {
    /// The token text as it appears in the token sequence.
    #[must_use]
    pub fn as_str(&self) -> &'i str {
        match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Quoted(s) | Token::Word(s) => *s,
        }
    }

    pub(crate) fn is_keyword(&self) -> bool {
        matches!(self, Token::Word("AND" | "OR"))
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Quoted(s) => write!(f, "'{s}'"),
            other => f.write_str(other.as_str()),
        }
    }
}

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// An unterminated quote runs to the end of input.
fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded(
        '\'',
        terminated(take_while(0.., |c: char| c != '\''), opt('\'')),
    )
    .parse_next(input)
}

fn word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| {
        !c.is_ascii_whitespace() && c != '(' && c != ')'
    })
    .parse_next(input)
}

fn token<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    alt((
        '('.value(Token::LParen),
        ')'.value(Token::RParen),
        quoted.map(Token::Quoted),
        word.map(Token::Word),
    ))
    .parse_next(input)
}

/// Split rule text into tokens.
///
/// Never fails: every non-whitespace character starts some token, and
/// malformed input is reported by the parser instead.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut input = text;
    let mut tokens = Vec::new();
    while let Ok(tok) = preceded(ws, token).parse_next(&mut input) {
        tokens.push(tok);
    }
    tracing::trace!(count = tokens.len(), "tokenized rule");
    tokens
}
