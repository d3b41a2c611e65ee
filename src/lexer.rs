//! Byte-cursor lexer with single-token lookahead.
//!
//! `next_token` scans one token, stores it as the current token, and returns
//! it; after the end of input it keeps yielding `Eof`. Whitespace and `//`
//! line comments are skipped, and every `\n` seen bumps the line counter,
//! including newlines inside string literals.

use crate::error::{LexError, LexErrorKind};
use crate::intern::{Interner, Symbol};
use crate::token::{keyword_kind, Span, Token, TokenType};

pub struct Lexer<'src, 'i> {
    source: &'src str,
    bytes: &'src [u8],
    position: usize,
    line: u32,
    interner: &'i mut Interner,
    current: Token,
}

impl<'src, 'i> Lexer<'src, 'i> {
    pub fn new(source: &'src str, interner: &'i mut Interner) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            position: 0,
            line: 1,
            interner,
            current: Token::eof(1, 0),
        }
    }

    /// The most recently scanned token. Meaningful only after the first
    /// `next_token` call.
    pub fn current(&self) -> Token {
        self.current
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    /// Scan and return the next token, updating the current-token field.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let start = self.position;
        let line = self.line;

        let token = match self.peek(0) {
            None => Token::eof(line, start),
            Some(b) => match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.lex_identifier(start, line),
                b'0'..=b'9' => self.lex_number(start, line)?,
                b'\'' | b'"' => self.lex_string(start, line)?,
                b'>' | b'<' | b'=' | b'!' | b'&' | b'|' => self.lex_operator(start, line),
                _ => self.lex_single(start, line),
            },
        };

        self.current = token;
        Ok(token)
    }

    /// Skip whitespace and `//` comments, counting newlines.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek(0) {
                Some(b'\n') => {
                    self.line += 1;
                    self.position += 1;
                }
                Some(b) if b.is_ascii_whitespace() => self.position += 1,
                Some(b'/') if self.peek(1) == Some(b'/') => {
                    while let Some(b) = self.peek(0) {
                        if b == b'\n' {
                            break;
                        }
                        self.position += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`, then keyword classification.
    fn lex_identifier(&mut self, start: usize, line: u32) -> Token {
        while let Some(b) = self.peek(0) {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.position += 1;
            } else {
                break;
            }
        }
        let text: &'src str = &self.source[start..self.position];
        let kind = keyword_kind(text).unwrap_or(TokenType::Identifier);
        let lexeme = self.interner.intern(text);
        Token::new(kind, lexeme, line, Span::new(start, self.position))
    }

    /// Digits, optionally followed by `.` and fraction digits.
    fn lex_number(&mut self, start: usize, line: u32) -> Result<Token, LexError> {
        while let Some(b'0'..=b'9') = self.peek(0) {
            self.position += 1;
        }

        let mut kind = TokenType::Integer;
        if self.peek(0) == Some(b'.') {
            kind = TokenType::Float;
            self.position += 1;
            while let Some(b'0'..=b'9') = self.peek(0) {
                self.position += 1;
            }
        }

        let text: &'src str = &self.source[start..self.position];
        let span = Span::new(start, self.position);
        if kind == TokenType::Integer && text.parse::<i64>().is_err() {
            return Err(LexError::new(
                LexErrorKind::IntegerOverflow {
                    lexeme: text.to_string(),
                },
                line,
                span,
            ));
        }

        let lexeme = self.interner.intern(text);
        Ok(Token::new(kind, lexeme, line, span))
    }

    /// Quoted string with `\n` `\t` `\r` escapes; any other escaped
    /// character passes through with the backslash consumed. The token's
    /// line is the line the opening quote is on.
    fn lex_string(&mut self, start: usize, line: u32) -> Result<Token, LexError> {
        let quote = self.bytes[start];
        self.position += 1;

        let mut buf = String::new();
        loop {
            match self.peek(0) {
                None => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedString,
                        line,
                        Span::new(start, self.position),
                    ));
                }
                Some(b) if b == quote => {
                    self.position += 1;
                    break;
                }
                Some(b'\\') => {
                    self.position += 1;
                    match self.peek(0) {
                        None => {
                            return Err(LexError::new(
                                LexErrorKind::UnterminatedString,
                                line,
                                Span::new(start, self.position),
                            ));
                        }
                        Some(b'n') => {
                            buf.push('\n');
                            self.position += 1;
                        }
                        Some(b't') => {
                            buf.push('\t');
                            self.position += 1;
                        }
                        Some(b'r') => {
                            buf.push('\r');
                            self.position += 1;
                        }
                        Some(_) => {
                            let c = self.char_at(self.position);
                            if c == '\n' {
                                self.line += 1;
                            }
                            buf.push(c);
                            self.position += c.len_utf8();
                        }
                    }
                }
                Some(b'\n') => {
                    self.line += 1;
                    buf.push('\n');
                    self.position += 1;
                }
                Some(_) => {
                    let c = self.char_at(self.position);
                    buf.push(c);
                    self.position += c.len_utf8();
                }
            }
        }

        let lexeme = self.interner.intern(&buf);
        Ok(Token::new(
            TokenType::Str,
            lexeme,
            line,
            Span::new(start, self.position),
        ))
    }

    /// `> < = !` with one-character lookahead for `>= <= == !=`, plus the
    /// doubled forms `>> << && ||`. Bare characters stay single-char tokens.
    fn lex_operator(&mut self, start: usize, line: u32) -> Token {
        let b = self.bytes[start];
        self.position += 1;

        let mut kind = TokenType::SingleChar;
        match b {
            b'>' | b'<' => {
                if self.peek(0) == Some(b'=') {
                    self.position += 1;
                    kind = TokenType::OpCompare;
                } else if self.peek(0) == Some(b) {
                    self.position += 1;
                }
            }
            b'=' | b'!' => {
                if self.peek(0) == Some(b'=') {
                    self.position += 1;
                    kind = TokenType::OpCompare;
                }
            }
            b'&' | b'|' => {
                if self.peek(0) == Some(b) {
                    self.position += 1;
                }
            }
            _ => {}
        }

        let text: &'src str = &self.source[start..self.position];
        let lexeme = self.interner.intern(text);
        Token::new(kind, lexeme, line, Span::new(start, self.position))
    }

    /// Any other character is its own token; the parser decides whether it
    /// means anything.
    fn lex_single(&mut self, start: usize, line: u32) -> Token {
        let c = self.char_at(start);
        self.position += c.len_utf8();
        let text: &'src str = &self.source[start..self.position];
        let lexeme = self.interner.intern(text);
        Token::new(
            TokenType::SingleChar,
            lexeme,
            line,
            Span::new(start, self.position),
        )
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position + offset).copied()
    }

    fn char_at(&self, pos: usize) -> char {
        self.source[pos..].chars().next().unwrap_or('\0')
    }
}
