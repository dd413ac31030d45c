//! Lexer for constraint expressions and declarations.
//!
//! Both grammars share one token set. Identifiers may contain `.` so a
//! dotted path scans as a single token, and `%` so escaped names survive
//! until the parser unescapes them.

use dapstream_foundation::RelOp;

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer over request or declaration text.
pub struct Lexer<'src> {
    source: &'src str,
    rest: &'src str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer positioned at the start of `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scans the next token. Returns [`TokenKind::Eof`] forever once exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let (line, column) = (self.line, self.column);

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => self.scan(c),
        };

        Token::new(kind, Span::new(start, self.position, line, column))
    }

    /// Scans every token, ending with [`TokenKind::Eof`].
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn scan(&mut self, c: char) -> TokenKind {
        let single = match c {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            ';' => Some(TokenKind::Semicolon),
            '&' => Some(TokenKind::Ampersand),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance();
            return kind;
        }

        match c {
            '=' | '!' | '<' | '>' => self.scan_operator(c),
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(),
            '-' | '+' if self.peek_char_n(1).is_some_and(|n| n.is_ascii_digit()) => {
                self.scan_number()
            }
            c if is_ident_start(c) => self.scan_ident(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        }
    }

    fn scan_operator(&mut self, first: char) -> TokenKind {
        self.advance();
        let next = self.peek_char();
        let (op, extra) = match (first, next) {
            ('=', Some('~')) => (RelOp::Regexp, true),
            ('=', _) => (RelOp::Equal, false),
            ('!', Some('=')) => (RelOp::NotEqual, true),
            ('!', _) => return TokenKind::Error("expected '=' after '!'".into()),
            ('<', Some('=')) => (RelOp::LessEqual, true),
            ('<', _) => (RelOp::Less, false),
            ('>', Some('=')) => (RelOp::GreaterEqual, true),
            _ => (RelOp::Greater, false),
        };
        if extra {
            self.advance();
        }
        TokenKind::Op(op)
    }

    fn scan_string(&mut self) -> TokenKind {
        self.advance();
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    return TokenKind::Str(text);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some(c @ ('"' | '\\')) => {
                            self.advance();
                            text.push(c);
                        }
                        Some(c) => return TokenKind::Error(format!("invalid escape sequence: \\{c}")),
                        None => return TokenKind::Error("unterminated string literal".into()),
                    }
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => return TokenKind::Error("unterminated string literal".into()),
            }
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;
        let mut is_float = false;

        if matches!(self.peek_char(), Some('-' | '+')) {
            self.advance();
        }
        self.skip_digits();
        if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.skip_digits();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let signed = matches!(self.peek_char_n(1), Some('-' | '+'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_char_n(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        let text = &self.source[start..self.position];
        if is_float {
            text.parse::<f64>()
                .map_or_else(|e| TokenKind::Error(format!("invalid number: {e}")), TokenKind::Float)
        } else {
            text.parse::<i128>()
                .map_or_else(|e| TokenKind::Error(format!("invalid integer: {e}")), TokenKind::Integer)
        }
    }

    fn scan_ident(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(is_ident_char) {
            self.advance();
        }
        TokenKind::Ident(self.source[start..self.position].to_string())
    }

    fn skip_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '%'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '%' | '.' | '-' | '+' | '/')
}
