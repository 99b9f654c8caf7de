//! Tokenizer for ISO 10303-21 exchange files.
//!
//! Produces instance names (`#12`), quoted strings, reals (`1.`, `-2.5E-3`),
//! integers, enumeration literals (`.T.`), standard keywords and the
//! punctuation of the exchange structure. Comments (`/* ... */`) are
//! skipped.

use crate::error::StepError;

/// A lexical unit of an exchange file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Upper-cased keyword such as `DATA` or `EDGE_CURVE`.
    Keyword(String),
    /// Instance name `#n`.
    EntityRef(u64),
    /// Quoted string with `''` unescaped.
    String(String),
    /// Number with a decimal point or exponent.
    Real(f64),
    /// Number without a decimal point.
    Integer(i64),
    /// Upper-cased enumeration literal without its dots.
    Enum(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `=`
    Equals,
    /// `*`, an attribute redeclared as derived.
    Asterisk,
    /// `$`, an omitted optional attribute.
    Dollar,
}

/// 1-based line and column of a token.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    /// Line, starting at 1.
    pub line: usize,
    /// Column, starting at 1.
    pub col: usize,
}

/// A token and where it starts.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    /// What was read.
    pub token: Token,
    /// Where it starts.
    pub pos: Position,
}

/// Streaming tokenizer over the raw bytes of a file.
///
/// Also usable as an iterator of `Result<SpannedToken, StepError>`; it
/// stops after the first error.
pub struct Lexer<'a> {
    src: &'a [u8],
    at: usize,
    here: Position,
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Start at the beginning of `src`.
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            at: 0,
            here: Position { line: 1, col: 1 },
            failed: false,
        }
    }

    /// Read every remaining token.
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, StepError> {
        self.collect()
    }

    /// Read one token; `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>, StepError> {
        self.skip_trivia();
        let start = self.here;
        let Some(b) = self.peek(0) else {
            return Ok(None);
        };

        let token = if let Some(p) = punctuation(b) {
            self.bump();
            p
        } else {
            match b {
                b'#' => self.instance_name()?,
                b'\'' => self.string()?,
                b'.' => self.enumeration()?,
                b'0'..=b'9' => self.number()?,
                b'+' | b'-' if self.peek(1).is_some_and(|c| c.is_ascii_digit() || c == b'.') => {
                    self.number()?
                }
                b if b.is_ascii_alphabetic() || b == b'_' => self.keyword(),
                other => {
                    return Err(self.error_at(
                        start,
                        format!("unexpected character: '{}'", other as char),
                    ))
                }
            }
        };

        Ok(Some(SpannedToken { token, pos: start }))
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.src.get(self.at + ahead).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek(0)?;
        self.at += 1;
        if b == b'\n' {
            self.here.line += 1;
            self.here.col = 1;
        } else {
            self.here.col += 1;
        }
        Some(b)
    }

    fn scan(&mut self, accept: impl Fn(u8) -> bool) -> String {
        let mut text = String::new();
        while let Some(b) = self.peek(0).filter(|&b| accept(b)) {
            text.push(b as char);
            self.bump();
        }
        text
    }

    fn error_at(&self, pos: Position, message: impl Into<String>) -> StepError {
        StepError::lexer(pos.line, pos.col, message)
    }

    fn skip_trivia(&mut self) {
        loop {
            self.scan(|b| b.is_ascii_whitespace());
            if self.peek(0) != Some(b'/') || self.peek(1) != Some(b'*') {
                return;
            }
            self.bump();
            self.bump();
            // an unterminated comment runs to the end of input
            while self.peek(0).is_some() && !(self.peek(0) == Some(b'*') && self.peek(1) == Some(b'/')) {
                self.bump();
            }
            self.bump();
            self.bump();
        }
    }

    fn instance_name(&mut self) -> Result<Token, StepError> {
        let start = self.here;
        self.bump();
        let digits = self.scan(|b| b.is_ascii_digit());
        if digits.is_empty() {
            return Err(self.error_at(start, "expected digits after '#'"));
        }
        digits
            .parse()
            .map(Token::EntityRef)
            .map_err(|_| self.error_at(start, format!("instance name out of range: #{digits}")))
    }

    fn string(&mut self) -> Result<Token, StepError> {
        let start = self.here;
        self.bump();
        let mut bytes = Vec::new();
        loop {
            match self.bump() {
                Some(b'\'') if self.peek(0) == Some(b'\'') => {
                    self.bump();
                    bytes.push(b'\'');
                }
                Some(b'\'') => break,
                Some(b) => bytes.push(b),
                None => return Err(self.error_at(start, "unterminated string")),
            }
        }
        Ok(Token::String(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn enumeration(&mut self) -> Result<Token, StepError> {
        let start = self.here;
        self.bump();
        let name = self.scan(|b| b.is_ascii_alphanumeric() || b == b'_');
        if self.bump() != Some(b'.') {
            return Err(self.error_at(start, "unterminated enumeration"));
        }
        if name.is_empty() {
            return Err(self.error_at(start, "empty enumeration"));
        }
        Ok(Token::Enum(name.to_ascii_uppercase()))
    }

    fn number(&mut self) -> Result<Token, StepError> {
        let start = self.here;
        let mut text = self.scan(|b| b == b'+' || b == b'-');
        text += &self.scan(|b| b.is_ascii_digit());

        let mut real = false;
        // a dot after the integer part always belongs to the number: `1.`, `0.E0`
        if self.peek(0) == Some(b'.') {
            self.bump();
            real = true;
            text.push('.');
            let fraction = self.scan(|b| b.is_ascii_digit());
            text += if fraction.is_empty() { "0" } else { fraction.as_str() };
        }
        if matches!(self.peek(0), Some(b'E' | b'e')) {
            self.bump();
            real = true;
            text.push('E');
            text += &self.scan(|b| b == b'+' || b == b'-');
            text += &self.scan(|b| b.is_ascii_digit());
        }

        if real {
            text.parse()
                .map(Token::Real)
                .map_err(|_| self.error_at(start, format!("invalid real number: {text}")))
        } else {
            text.parse()
                .map(Token::Integer)
                .map_err(|_| self.error_at(start, format!("invalid integer: {text}")))
        }
    }

    fn keyword(&mut self) -> Token {
        // `-` occurs in ISO-10303-21 and END-ISO-10303-21
        let word = self.scan(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        Token::Keyword(word.to_ascii_uppercase())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<SpannedToken, StepError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.next_token();
        self.failed = next.is_err();
        next.transpose()
    }
}

fn punctuation(b: u8) -> Option<Token> {
    Some(match b {
        b'(' => Token::LParen,
        b')' => Token::RParen,
        b',' => Token::Comma,
        b';' => Token::Semicolon,
        b'=' => Token::Equals,
        b'*' => Token::Asterisk,
        b'$' => Token::Dollar,
        _ => return None,
    })
}
