//! Tokenizer for the object-literal subset of TypeScript.
//!
//! Whitespace and comments are skipped. Every token carries its byte span so
//! the parser can map structure back onto the untouched source text.

use crate::error::StoreError;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident(String),
    /// Numeric literal, raw text.
    Number(String),
    /// Single- or double-quoted string with escapes decoded.
    Str(String),
    /// Template literal. Contents are skipped, not interpreted.
    Template,
    /// `...`
    Spread,
    /// `=>`
    Arrow,
    /// Any other single character.
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn is_punct(&self, ch: char) -> bool {
        matches!(self.kind, TokenKind::Punct(c) if c == ch)
    }
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::at(src, 0)
    }

    /// Start lexing at byte offset `pos`, which must be a char boundary.
    pub fn at(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, StoreError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let kind = match ch {
            '\'' | '"' => TokenKind::Str(self.string(ch)?),
            '`' => {
                self.template()?;
                TokenKind::Template
            }
            '.' if self.rest().starts_with("...") => {
                self.pos += 3;
                TokenKind::Spread
            }
            '=' if self.rest().starts_with("=>") => {
                self.pos += 2;
                TokenKind::Arrow
            }
            c if c.is_ascii_digit()
                || (c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                TokenKind::Number(self.number())
            }
            c if is_ident_start(c) => TokenKind::Ident(self.ident()),
            c => {
                self.bump();
                TokenKind::Punct(c)
            }
        };

        Ok(Some(Token {
            kind,
            span: start..self.pos,
        }))
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_trivia(&mut self) -> Result<(), StoreError> {
        loop {
            let rest = self.rest();
            if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                let Some(end) = rest[2..].find("*/") else {
                    return Err(StoreError::syntax(self.pos, "unterminated block comment"));
                };
                self.pos += end + 4;
            } else if self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_part) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn number(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let lexeme = &self.src[start..self.pos];
            let exponent_sign = (c == '+' || c == '-')
                && lexeme.ends_with(['e', 'E'])
                && !lexeme.starts_with("0x")
                && !lexeme.starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                self.bump();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn string(&mut self, quote: char) -> Result<String, StoreError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(start, &mut out)?,
                Some('\n') | None => {
                    return Err(StoreError::syntax(start, "unterminated string literal"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, start: usize, out: &mut String) -> Result<(), StoreError> {
        let Some(ch) = self.bump() else {
            return Err(StoreError::syntax(start, "unterminated string literal"));
        };
        match ch {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // Line continuation.
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let code = self.hex_digits(start, 2)?;
                out.push(to_char(start, code)?);
            }
            'u' => {
                let code = self.unicode_escape(start)?;
                out.push(to_char(start, code)?);
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn unicode_escape(&mut self, start: usize) -> Result<u32, StoreError> {
        if self.peek() == Some('{') {
            self.bump();
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits = &self.src[digits_start..self.pos];
            if self.bump() != Some('}') {
                return Err(StoreError::syntax(start, "invalid unicode escape"));
            }
            return parse_hex(start, digits);
        }

        let high = self.hex_digits(start, 4)?;
        if (0xD800..0xDC00).contains(&high) && self.rest().starts_with("\\u") {
            let checkpoint = self.pos;
            self.pos += 2;
            let low = self.hex_digits(start, 4)?;
            if (0xDC00..0xE000).contains(&low) {
                return Ok(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
            }
            self.pos = checkpoint;
        }
        Ok(high)
    }

    fn hex_digits(&mut self, start: usize, len: usize) -> Result<u32, StoreError> {
        let digits_start = self.pos;
        for _ in 0..len {
            match self.bump() {
                Some(c) if c.is_ascii_hexdigit() => {}
                _ => return Err(StoreError::syntax(start, "invalid escape sequence")),
            }
        }
        parse_hex(start, &self.src[digits_start..self.pos])
    }

    fn template(&mut self) -> Result<(), StoreError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some('`') => return Ok(()),
                Some('\\') => {
                    self.bump();
                }
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    self.skip_substitution(start)?;
                }
                Some(_) => {}
                None => return Err(StoreError::syntax(start, "unterminated template literal")),
            }
        }
    }

    fn skip_substitution(&mut self, start: usize) -> Result<(), StoreError> {
        let mut depth = 0usize;
        loop {
            let Some(token) = self.next_token()? else {
                return Err(StoreError::syntax(start, "unterminated template literal"));
            };
            match token.kind {
                TokenKind::Punct('{') => depth += 1,
                TokenKind::Punct('}') if depth == 0 => return Ok(()),
                TokenKind::Punct('}') => depth -= 1,
                _ => {}
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && !c.is_whitespace())
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn parse_hex(start: usize, digits: &str) -> Result<u32, StoreError> {
    u32::from_str_radix(digits, 16)
        .map_err(|_| StoreError::syntax(start, "invalid escape sequence"))
}

fn to_char(start: usize, code: u32) -> Result<char, StoreError> {
    char::from_u32(code).ok_or_else(|| StoreError::syntax(start, "escape is not a valid code point"))
}
