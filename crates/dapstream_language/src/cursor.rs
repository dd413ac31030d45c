//! Token lookahead and error reporting shared by both parsers.

use dapstream_foundation::escape::www_to_id;
use dapstream_foundation::{Error, ErrorKind, Result};

use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// A one-token lookahead over a lexer.
pub(crate) struct Cursor<'src> {
    lexer: Lexer<'src>,
    pub(crate) current: Token,
    source: &'src str,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source,
        }
    }

    pub(crate) fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// True if the current token has the same kind as `kind`, ignoring payloads.
    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Consumes the current token if it matches, else fails.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Result<Span> {
        if self.at(expected) {
            let span = self.current.span;
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(&expected.name()))
        }
    }

    /// Consumes an identifier and returns it unescaped.
    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<(String, Span)> {
        if let TokenKind::Ident(raw) = &self.current.kind {
            let name = www_to_id(raw);
            let span = self.current.span;
            self.advance();
            Ok((name, span))
        } else {
            Err(self.unexpected(what))
        }
    }

    /// Error for a token that is not what the grammar wants here.
    ///
    /// Lexer errors are reported with their own message.
    pub(crate) fn unexpected(&self, wanted: &str) -> Error {
        match &self.current.kind {
            TokenKind::Error(message) => self.error(message),
            other => self.error(&format!("expected {wanted}, found {}", other.name())),
        }
    }

    pub(crate) fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    pub(crate) fn error_at(&self, span: Span, message: &str) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.to_string(),
            line: span.line,
            column: span.column,
            context: span.line_text(self.source).to_string(),
        })
    }
}
