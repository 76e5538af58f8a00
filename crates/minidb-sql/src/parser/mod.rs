//! Command parser for MiniDB.
//!
//! This module turns one line of command text into a [`Statement`]
//! descriptor. The language is deliberately small: one table per command,
//! bare-word literals and at most one WHERE comparison.
//!
//! # Supported commands
//!
//! - `CREATE TABLE t (col TYPE, ...)`
//! - `INSERT INTO t VALUES (v1, v2, ...)`
//! - `SELECT * | c1, c2 FROM t [WHERE c op v]`
//! - `UPDATE t SET c = v [WHERE c op v]`
//! - `DELETE FROM t [WHERE c op v]`
//! - `DROP TABLE t`
//!
//! Keywords are case-insensitive and identifiers are lowercased. Literals
//! are bare words or single-quoted strings (`'Sara Ali'`, `'it''s'`).
//!
//! # Usage
//!
//! ```
//! use minidb_sql::parser::{Parser, Statement};
//!
//! let stmt = Parser::parse("SELECT name FROM students WHERE age > 20").unwrap();
//! assert!(matches!(stmt, Statement::Select { .. }));
//! ```

use thiserror::Error;

use crate::types::DataType;

mod lexer;
mod statement;

pub use lexer::{tokenize, Token};
pub use statement::*;

/// Errors that can occur while parsing a command.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed command.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Unknown command keyword.
    #[error("unsupported command: {0}")]
    Unsupported(String),

    /// Quoted literal without a closing quote.
    #[error("unterminated quoted string")]
    UnterminatedString,

    /// Empty command.
    #[error("empty command")]
    EmptyQuery,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Command parser.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Parses a single command.
    pub fn parse(input: &str) -> ParseResult<Statement> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        let mut parser = Parser { tokens, pos: 0 };
        let statement = parser.parse_statement()?;
        parser.expect_end()?;
        Ok(statement)
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let Some(Token::Word(first)) = self.advance() else {
            return Err(ParseError::Syntax("expected a command keyword".into()));
        };

        match first.to_ascii_uppercase().as_str() {
            "CREATE" => self.parse_create(),
            "INSERT" => self.parse_insert(),
            "SELECT" => self.parse_select(),
            "UPDATE" => self.parse_update(),
            "DELETE" => self.parse_delete(),
            "DROP" => self.parse_drop(),
            _ => Err(ParseError::Unsupported(first)),
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn parse_create(&mut self) -> ParseResult<Statement> {
        self.expect_keyword("TABLE")?;
        let table = self.parse_identifier("table name")?;
        self.expect(Token::LParen)?;

        let mut columns = Vec::new();
        if !self.consume(&Token::RParen) {
            loop {
                let name = self.parse_identifier("column name")?;
                let type_name = match self.advance() {
                    Some(Token::Word(w)) => w,
                    other => return Err(unexpected("a column type", other)),
                };
                columns.push(ColumnSpec::new(name, DataType::from_type_name(&type_name)));

                if self.consume(&Token::RParen) {
                    break;
                }
                self.expect(Token::Comma)?;
            }
        }

        Ok(Statement::CreateTable { table, columns })
    }

    fn parse_insert(&mut self) -> ParseResult<Statement> {
        self.expect_keyword("INTO")?;
        let table = self.parse_identifier("table name")?;
        self.expect_keyword("VALUES")?;
        self.expect(Token::LParen)?;

        let mut values = Vec::new();
        if !self.consume(&Token::RParen) {
            loop {
                values.push(self.parse_literal()?);
                if self.consume(&Token::RParen) {
                    break;
                }
                self.expect(Token::Comma)?;
            }
        }

        Ok(Statement::Insert { table, values })
    }

    fn parse_select(&mut self) -> ParseResult<Statement> {
        let projection = if self.consume(&Token::Word("*".into())) {
            Projection::All
        } else {
            let mut columns = vec![self.parse_identifier("column name")?];
            while self.consume(&Token::Comma) {
                columns.push(self.parse_identifier("column name")?);
            }
            Projection::Columns(columns)
        };

        self.expect_keyword("FROM")?;
        let table = self.parse_identifier("table name")?;
        let filter = self.parse_where()?;

        Ok(Statement::Select {
            table,
            projection,
            filter,
        })
    }

    fn parse_update(&mut self) -> ParseResult<Statement> {
        let table = self.parse_identifier("table name")?;
        self.expect_keyword("SET")?;
        let column = self.parse_identifier("column name")?;
        self.expect(Token::Op("=".into()))?;
        let value = self.parse_literal()?;
        let filter = self.parse_where()?;

        Ok(Statement::Update {
            table,
            assignment: Assignment { column, value },
            filter,
        })
    }

    fn parse_delete(&mut self) -> ParseResult<Statement> {
        self.expect_keyword("FROM")?;
        let table = self.parse_identifier("table name")?;
        let filter = self.parse_where()?;

        Ok(Statement::Delete { table, filter })
    }

    fn parse_drop(&mut self) -> ParseResult<Statement> {
        self.expect_keyword("TABLE")?;
        let table = self.parse_identifier("table name")?;

        Ok(Statement::DropTable { table })
    }

    fn parse_where(&mut self) -> ParseResult<Option<WhereClause>> {
        if !self.peek().is_some_and(|t| t.is_keyword("WHERE")) {
            return Ok(None);
        }
        self.pos += 1;

        let column = self.parse_identifier("column name")?;
        let operator = match self.advance() {
            Some(Token::Op(op)) => op,
            other => return Err(unexpected("a comparison operator", other)),
        };
        let value = self.parse_literal()?;

        Ok(Some(WhereClause {
            column,
            operator,
            value,
        }))
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.consume(&expected) {
            Ok(())
        } else {
            Err(unexpected(&format!("'{}'", expected), self.peek().cloned()))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            Ok(())
        } else {
            Err(unexpected(keyword, self.peek().cloned()))
        }
    }

    fn expect_end(&self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::Syntax(format!(
                "unexpected trailing token '{}'",
                token
            ))),
        }
    }

    fn parse_identifier(&mut self, what: &str) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Word(w)) if w != "*" => Ok(w.trim().to_ascii_lowercase()),
            other => Err(unexpected(what, other)),
        }
    }

    fn parse_literal(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Word(w)) => Ok(w),
            Some(Token::Quoted(q)) => Ok(q),
            other => Err(unexpected("a value", other)),
        }
    }
}

fn unexpected(expected: &str, found: Option<Token>) -> ParseError {
    match found {
        Some(token) => ParseError::Syntax(format!("expected {}, found '{}'", expected, token)),
        None => ParseError::Syntax(format!("expected {}, found end of command", expected)),
    }
}
