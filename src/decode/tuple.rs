//! Scalar grammar for a single tuple line.
//!
//! The engine prints rows as `(v1, v2, ...)`, which is close to a generic
//! array literal. A line is rewritten to `[v1, v2, ...]` and scanned here.
//! Accepted scalars:
//! - Integers: `42`, `-7`
//! - Decimals: `3.5`, `1e3`
//! - Double-quoted strings (what the engine emits for TEXT columns)
//! - Single-quoted strings (what statements carry)
//! - `NULL`, `true`, `false`
//!
//! Anything else is a parse error, and the caller drops the line.

use super::value::{Row, Value};
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// Why a row-shaped line could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowParseError {
    #[error("line is not enclosed in parentheses")]
    NotATuple,

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown bare word '{0}'")]
    UnknownWord(String),

    #[error("trailing characters after closing bracket at offset {0}")]
    TrailingInput(usize),
}

type Chars<'a> = Peekable<CharIndices<'a>>;

/// Rewrites the enclosing parentheses of a trimmed line into brackets.
pub fn to_sequence_literal(line: &str) -> Result<String, RowParseError> {
    let inner = line
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or(RowParseError::NotATuple)?;
    Ok(format!("[{inner}]"))
}

/// Parses a `[...]` sequence literal into a row.
pub fn parse_sequence(input: &str) -> Result<Row, RowParseError> {
    let mut chars = input.char_indices().peekable();
    let mut row = Vec::new();

    expect(&mut chars, '[')?;
    skip_whitespace(&mut chars);

    if let Some(&(_, ']')) = chars.peek() {
        chars.next();
        return finish(&mut chars, row);
    }

    loop {
        skip_whitespace(&mut chars);
        row.push(parse_scalar(&mut chars)?);
        skip_whitespace(&mut chars);

        match chars.next() {
            Some((_, ',')) => continue,
            Some((_, ']')) => break,
            Some((offset, found)) => return Err(RowParseError::UnexpectedChar { found, offset }),
            None => return Err(RowParseError::UnexpectedEnd),
        }
    }

    finish(&mut chars, row)
}

/// Parses one trimmed tuple line (`(...)`) into a row.
pub fn parse_tuple(line: &str) -> Result<Row, RowParseError> {
    parse_sequence(&to_sequence_literal(line)?)
}

fn finish(chars: &mut Chars<'_>, row: Row) -> Result<Row, RowParseError> {
    skip_whitespace(chars);
    match chars.next() {
        None => Ok(row),
        Some((offset, _)) => Err(RowParseError::TrailingInput(offset)),
    }
}

fn expect(chars: &mut Chars<'_>, want: char) -> Result<(), RowParseError> {
    match chars.next() {
        Some((_, c)) if c == want => Ok(()),
        Some((offset, found)) => Err(RowParseError::UnexpectedChar { found, offset }),
        None => Err(RowParseError::UnexpectedEnd),
    }
}

fn skip_whitespace(chars: &mut Chars<'_>) {
    while let Some(&(_, c)) = chars.peek() {
        if !c.is_whitespace() {
            break;
        }
        chars.next();
    }
}

fn parse_scalar(chars: &mut Chars<'_>) -> Result<Value, RowParseError> {
    match chars.peek().copied() {
        Some((offset, quote @ ('"' | '\''))) => {
            chars.next();
            parse_quoted(chars, quote, offset).map(Value::String)
        }
        Some((_, c)) if c == '-' || c == '+' || c.is_ascii_digit() => parse_number(chars),
        Some((_, c)) if c.is_alphabetic() => parse_word(chars),
        Some((offset, found)) => Err(RowParseError::UnexpectedChar { found, offset }),
        None => Err(RowParseError::UnexpectedEnd),
    }
}

/// Collects a quoted string. The opening quote has already been consumed.
fn parse_quoted(chars: &mut Chars<'_>, quote: char, start: usize) -> Result<String, RowParseError> {
    let mut out = String::new();

    while let Some((_, c)) = chars.next() {
        if c == quote {
            return Ok(out);
        }
        if c == '\\' {
            match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, escaped @ ('\\' | '"' | '\''))) => out.push(escaped),
                // Unknown escape: keep it verbatim
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            }
        } else {
            out.push(c);
        }
    }

    Err(RowParseError::UnterminatedString(start))
}

fn parse_number(chars: &mut Chars<'_>) -> Result<Value, RowParseError> {
    let mut text = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-') {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Value::Float(f)),
        _ => Err(RowParseError::InvalidNumber(text)),
    }
}

fn parse_word(chars: &mut Chars<'_>) -> Result<Value, RowParseError> {
    let mut word = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }

    match word.as_str() {
        "NULL" | "null" => Ok(Value::Null),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(RowParseError::UnknownWord(word)),
    }
}
