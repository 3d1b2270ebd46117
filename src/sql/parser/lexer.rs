//! Filter lexer - splits one filter statement into column, operator and value tokens

use std::{fmt::Display, iter::Peekable, str::CharIndices};

use crate::error::{Error, Result};

use super::ast::Operator;

/// A single lexical token of a filter statement
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Column name, everything before the first operator
    Column(String),
    Operator(Operator),
    /// Raw value text, everything after the operator
    Value(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Column(column) => f.write_str(column),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Value(value) => f.write_str(value),
        }
    }
}

/// Position of the lexer within the statement
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Column,
    Operator,
    Value,
    Done,
}

/// Filter statement lexer
///
/// Runs a three-state machine over the trimmed input. The first operator
/// found scanning left to right ends the column, so column names can never
/// contain an operator.
pub struct Lexer<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
    state: State,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan().transpose()
    }
}

impl<'a> Lexer<'a> {
    pub fn new(statement: &'a str) -> Self {
        let source = statement.trim();
        Self {
            source,
            iter: source.char_indices().peekable(),
            state: State::Column,
        }
    }

    fn scan(&mut self) -> Result<Option<Token>> {
        let token = match self.state {
            State::Column => self.scan_column(),
            State::Operator => self.scan_operator(),
            State::Value => self.scan_value(),
            State::Done => return Ok(None),
        };
        if token.is_err() {
            self.state = State::Done;
        }
        token.map(Some)
    }

    /// Consumes characters up to the first operator
    fn scan_column(&mut self) -> Result<Token> {
        while let Some(&(pos, _)) = self.iter.peek() {
            if operator_at(&self.source[pos..]).is_some() {
                let column = self.source[..pos].trim();
                if column.is_empty() {
                    return Err(Error::Parse(format!(
                        "[Lexer] No column name before operator in '{}'",
                        self.source
                    )));
                }
                self.state = State::Operator;
                return Ok(Token::Column(column.to_string()));
            }
            self.iter.next();
        }
        Err(Error::Parse(format!(
            "[Lexer] No operator (=, !=, <, >, IN) found in '{}'",
            self.source
        )))
    }

    fn scan_operator(&mut self) -> Result<Token> {
        let (pos, (op, len)) = self
            .iter
            .peek()
            .and_then(|&(pos, _)| Some((pos, operator_at(&self.source[pos..])?)))
            .ok_or_else(|| Error::Parse(format!("[Lexer] Expected operator in '{}'", self.source)))?;
        while self.iter.next_if(|&(i, _)| i < pos + len).is_some() {}
        self.state = State::Value;
        Ok(Token::Operator(op))
    }

    /// Takes the rest of the statement as the raw value
    fn scan_value(&mut self) -> Result<Token> {
        self.state = State::Done;
        let value = match self.iter.peek() {
            Some(&(pos, _)) => self.source[pos..].trim(),
            None => "",
        };
        if value.is_empty() {
            return Err(Error::Parse(format!(
                "[Lexer] No value after operator in '{}'",
                self.source
            )));
        }
        Ok(Token::Value(value.to_string()))
    }
}

/// Matches an operator at the start of `rest`, returning it with its byte length.
///
/// `IN` only counts with whitespace on both sides, in any case.
fn operator_at(rest: &str) -> Option<(Operator, usize)> {
    match rest.chars().next()? {
        '=' => Some((Operator::Equal, 1)),
        '!' if rest[1..].starts_with('=') => Some((Operator::NotEqual, 2)),
        '<' => Some((Operator::LessThan, 1)),
        '>' => Some((Operator::GreaterThan, 1)),
        c if c.is_whitespace() => {
            let lead = c.len_utf8();
            let keyword = rest.get(lead..lead + 2)?;
            if !keyword.eq_ignore_ascii_case("in") {
                return None;
            }
            let trail = rest[lead + 2..].chars().next().filter(|c| c.is_whitespace())?;
            Some((Operator::In, lead + 2 + trail.len_utf8()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token};
    use crate::{error::Result, sql::parser::ast::Operator};

    fn tokens(input: &str) -> Result<Vec<Token>> {
        Lexer::new(input).collect::<Result<Vec<_>>>()
    }

    #[test]
    fn test_lexer_comparisons() -> Result<()> {
        assert_eq!(
            tokens("petal_length=5.5")?,
            vec![
                Token::Column("petal_length".to_string()),
                Token::Operator(Operator::Equal),
                Token::Value("5.5".to_string()),
            ]
        );
        assert_eq!(
            tokens("  sepal_width  >  3.3 ")?,
            vec![
                Token::Column("sepal_width".to_string()),
                Token::Operator(Operator::GreaterThan),
                Token::Value("3.3".to_string()),
            ]
        );
        assert_eq!(tokens("species!=setosa")?[1], Token::Operator(Operator::NotEqual));
        assert_eq!(tokens("petal_width<1")?[1], Token::Operator(Operator::LessThan));
        Ok(())
    }

    #[test]
    fn test_lexer_in() -> Result<()> {
        assert_eq!(
            tokens("species iN\t(virginica, setosa)")?,
            vec![
                Token::Column("species".to_string()),
                Token::Operator(Operator::In),
                Token::Value("(virginica, setosa)".to_string()),
            ]
        );
        // no surrounding whitespace, not an operator
        assert!(tokens("species_in(a,b)").is_err());
        Ok(())
    }

    #[test]
    fn test_lexer_first_operator_wins() -> Result<()> {
        assert_eq!(
            tokens("a<b=c")?,
            vec![
                Token::Column("a".to_string()),
                Token::Operator(Operator::LessThan),
                Token::Value("b=c".to_string()),
            ]
        );
        assert_eq!(tokens("x in y = 1")?[2], Token::Value("y = 1".to_string()));
        Ok(())
    }

    #[test]
    fn test_lexer_errors() {
        assert!(tokens("petal_length").is_err());
        assert!(tokens("=5").is_err());
        assert!(tokens("petal_length=").is_err());
        assert!(tokens("petal_length =   ").is_err());
        assert!(tokens("").is_err());
    }
}
