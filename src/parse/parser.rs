use crate::{ComparisonType, Condition, MAX_DEPTH, Node, Operator, Value};

use super::error::ParseError;
use super::lexer::Token;

/// Recursive-descent parser over a token sequence.
///
/// Precedence, lowest first: `OR`, `AND`, parenthesized group or comparison.
/// Both connectives are left-associative. Trees deeper than [`MAX_DEPTH`]
/// and groups nested deeper than [`MAX_DEPTH`] are refused.
#[derive(Debug)]
pub struct Parser<'t, 'i> {
    tokens: &'t [Token<'i>],
    pos: usize,
    groups: usize,
}

// A parsed subtree with its depth.
type Parsed = (Node, usize);

impl<'t, 'i> Parser<'t, 'i> {
    #[must_use]
    pub fn new(tokens: &'t [Token<'i>]) -> Self {
        Self {
            tokens,
            pos: 0,
            groups: 0,
        }
    }

    /// Parse the whole token sequence into a single tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the sequence is empty, malformed, or has
    /// tokens left over after a complete expression.
    pub fn parse(mut self) -> Result<Node, ParseError> {
        let (node, _) = self.expr()?;
        match self.peek() {
            None => Ok(node),
            Some(tok) => Err(ParseError::TrailingTokens {
                found: tok.to_string(),
                position: self.pos,
            }),
        }
    }

    fn peek(&self) -> Option<Token<'i>> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token<'i>> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek() == Some(Token::Word(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, tok: Token<'_>, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            found: tok.to_string(),
            position: self.pos - 1,
            expected,
        }
    }

    // `at` is the position of the connective keyword.
    fn join(op: Operator, left: Parsed, right: Parsed, at: usize) -> Result<Parsed, ParseError> {
        let depth = 1 + left.1.max(right.1);
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                max: MAX_DEPTH,
                position: at,
            });
        }
        Ok((Node::join(op, left.0, right.0), depth))
    }

    fn expr(&mut self) -> Result<Parsed, ParseError> {
        let mut node = self.and_expr()?;
        while self.eat_keyword("OR") {
            let at = self.pos - 1;
            let right = self.and_expr()?;
            node = Self::join(Operator::Or, node, right, at)?;
        }
        Ok(node)
    }

    fn and_expr(&mut self) -> Result<Parsed, ParseError> {
        let mut node = self.primary()?;
        while self.eat_keyword("AND") {
            let at = self.pos - 1;
            let right = self.primary()?;
            node = Self::join(Operator::And, node, right, at)?;
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<Parsed, ParseError> {
        if self.peek() != Some(Token::LParen) {
            return Ok((self.comparison()?, 1));
        }
        let open = self.pos;
        if self.groups >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                max: MAX_DEPTH,
                position: open,
            });
        }
        self.pos += 1;
        self.groups += 1;
        let node = self.expr()?;
        self.groups -= 1;
        match self.advance() {
            Some(Token::RParen) => Ok(node),
            Some(tok) => Err(self.unexpected(tok, "AND, OR or ')'")),
            None => Err(ParseError::UnmatchedParen { position: open }),
        }
    }

    fn comparison(&mut self) -> Result<Node, ParseError> {
        let lvariable = match self.advance() {
            Some(tok @ Token::Word(name)) if !tok.is_keyword() => name.to_owned(),
            Some(tok) => return Err(self.unexpected(tok, "identifier")),
            None => return Err(ParseError::UnexpectedEnd { expected: "identifier" }),
        };

        let comparison_type = match self.advance() {
            Some(Token::Word(sym)) => {
                sym.parse::<ComparisonType>()
                    .map_err(|()| ParseError::UnknownComparator {
                        found: sym.to_owned(),
                        position: self.pos - 1,
                    })?
            }
            Some(tok) => return Err(self.unexpected(tok, "comparator")),
            None => return Err(ParseError::UnexpectedEnd { expected: "comparator" }),
        };

        let rvalue = match self.advance() {
            Some(Token::Quoted(text)) => Value::String(text.to_owned()),
            Some(tok @ Token::Word(text)) if !tok.is_keyword() => Value::from_literal(text),
            Some(tok) => return Err(self.unexpected(tok, "literal")),
            None => return Err(ParseError::UnexpectedEnd { expected: "literal" }),
        };

        Ok(Node::Operand(Condition {
            lvariable,
            rvalue,
            comparison_type,
        }))
    }
}
