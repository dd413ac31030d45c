//! Tokens shared by the constraint and declaration parsers.

use dapstream_foundation::RelOp;

use crate::span::Span;

/// A token and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// What was scanned.
    pub kind: TokenKind,
    /// Where it was scanned.
    pub span: Span,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Token kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `&`
    Ampersand,

    // Operators
    /// `=`, `!=`, `<`, `<=`, `>`, `>=` or `=~`
    Op(RelOp),

    // Literals
    /// Integer literal, wide enough for any signed or unsigned 64-bit value.
    Integer(i128),
    /// Decimal literal.
    Float(f64),
    /// Quoted text with escapes resolved.
    Str(String),
    /// Identifier or dotted path, still `%xx`-escaped.
    Ident(String),

    /// End of input.
    Eof,
    /// Lexer error.
    Error(String),
}

impl TokenKind {
    /// A short description for error messages.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::LBracket => "'['".into(),
            Self::RBracket => "']'".into(),
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::Comma => "','".into(),
            Self::Colon => "':'".into(),
            Self::Semicolon => "';'".into(),
            Self::Ampersand => "'&'".into(),
            Self::Op(op) => format!("'{}'", op.symbol()),
            Self::Integer(_) => "integer".into(),
            Self::Float(_) => "number".into(),
            Self::Str(_) => "string".into(),
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Eof => "end of input".into(),
            Self::Error(_) => "error".into(),
        }
    }
}
