use std::iter::Peekable;

use crate::error::{Error, Result};
use crate::sql::parser::ast::{Filter, Operator};
use crate::sql::parser::lexer::{Lexer, Token};

pub mod ast;
mod lexer;

/// Filter parser - converts one `where` statement into a [`Filter`]
///
/// Supported operators: `=`, `!=`, `<`, `>`, `IN`. No wildcards, no OR, no
/// nesting; several statements are combined with AND by the compiler.
pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser { lexer: Lexer::new(input).peekable() }
    }

    /// Parses the statement into `(column, operator, value)`
    pub fn parse(&mut self) -> Result<Filter> {
        let column = self.next_column()?;
        let operator = self.next_operator()?;
        let value = self.next_value()?;
        if let Some(token) = self.peek()? {
            return Err(Error::Parse(format!("[Parser] Unexpected token {}", token)));
        }
        Ok(Filter { column, operator, value })
    }

    fn peek(&mut self) -> Result<Option<Token>> {
        self.lexer.peek().cloned().transpose()
    }

    fn next(&mut self) -> Result<Token> {
        self.lexer
            .next()
            .unwrap_or_else(|| Err(Error::Parse("[Parser] Unexpected end of input".to_string())))
    }

    fn next_column(&mut self) -> Result<String> {
        match self.next()? {
            Token::Column(column) => Ok(column),
            token => Err(Error::Parse(format!("[Parser] Expected column, got token {}", token))),
        }
    }

    fn next_operator(&mut self) -> Result<Operator> {
        match self.next()? {
            Token::Operator(op) => Ok(op),
            token => Err(Error::Parse(format!("[Parser] Expected operator, got token {}", token))),
        }
    }

    fn next_value(&mut self) -> Result<String> {
        match self.next()? {
            Token::Value(value) => Ok(value),
            token => Err(Error::Parse(format!("[Parser] Expected value, got token {}", token))),
        }
    }
}

/// Parses every statement, failing on the first malformed one
pub fn parse_filters<S: AsRef<str>>(statements: &[S]) -> Result<Vec<Filter>> {
    statements
        .iter()
        .map(|statement| Parser::new(statement.as_ref()).parse())
        .collect()
}
