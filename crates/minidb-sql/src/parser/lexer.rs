//! Command tokenizer.

use std::fmt;

use super::{ParseError, ParseResult};

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare word: keyword, identifier, `*` or unquoted literal.
    Word(String),
    /// Single-quoted literal with the quotes removed.
    Quoted(String),
    /// Comparison operator: `=`, `<`, `>`, `!`, optionally followed by `=`.
    Op(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
}

impl Token {
    /// Returns true if this is a bare word equal to `keyword`, ignoring case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::Quoted(q) => write!(f, "'{}'", q.replace('\'', "''")),
            Token::Op(op) => f.write_str(op),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
        }
    }
}

/// Splits a command into tokens.
///
/// Whitespace separates words. One trailing `;` is ignored. A `'` only
/// opens a quoted literal at the start of a token, so words such as
/// `O'Brien` stay intact.
pub fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    let trimmed = input.trim_end();
    let input = trimmed.strip_suffix(';').unwrap_or(trimmed);

    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '(' | ')' | ',' | '=' | '<' | '>' | '!' => {
                flush(&mut word, &mut tokens);
                let token = match ch {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    _ => {
                        let mut op = ch.to_string();
                        if chars.peek() == Some(&'=') {
                            chars.next();
                            op.push('=');
                        }
                        Token::Op(op)
                    }
                };
                tokens.push(token);
            }
            '\'' if word.is_empty() => {
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some('\'') if chars.peek() == Some(&'\'') => {
                            chars.next();
                            literal.push('\'');
                        }
                        Some('\'') => break,
                        Some(c) => literal.push(c),
                        None => return Err(ParseError::UnterminatedString),
                    }
                }
                tokens.push(Token::Quoted(literal));
            }
            c if c.is_whitespace() => flush(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);

    Ok(tokens)
}

fn flush(word: &mut String, tokens: &mut Vec<Token>) {
    if !word.is_empty() {
        tokens.push(Token::Word(std::mem::take(word)));
    }
}
