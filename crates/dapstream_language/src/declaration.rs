//! Parser for declaration text.
//!
//! Reads what [`Dataset::print_declaration`] and
//! [`Dataset::print_constrained`] write:
//!
//! ```text
//! dataset := 'Dataset' '{' decl* '}' ident ';'
//! decl    := scalar_kw ident dim* ';'
//!          | ( 'Structure' | 'Sequence' ) '{' decl* '}' ident dim* ';'
//! dim     := '[' ( ident '=' )? int ']'
//! ```

use dapstream_foundation::{Result, TypeKind};
use dapstream_model::{Dataset, Variable};

use crate::cursor::Cursor;
use crate::span::Span;
use crate::token::TokenKind;

const DATASET_KEYWORD: &str = "Dataset";

/// Parser for one dataset declaration.
pub struct DeclarationParser<'src> {
    cursor: Cursor<'src>,
}

impl<'src> DeclarationParser<'src> {
    /// Creates a parser over `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Parses the whole input into an unselected, unread dataset.
    ///
    /// # Errors
    /// Returns a parse error for malformed text, unknown type keywords and
    /// zero-sized dimensions.
    pub fn parse(&mut self) -> Result<Dataset> {
        let (keyword, span) = self.cursor.expect_ident("'Dataset'")?;
        if keyword != DATASET_KEYWORD {
            return Err(self
                .cursor
                .error_at(span, &format!("expected 'Dataset', found '{keyword}'")));
        }
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let members = self.parse_members(open)?;
        let (name, _) = self.cursor.expect_ident("the dataset name")?;
        self.cursor.expect(&TokenKind::Semicolon)?;
        if !self.cursor.at(&TokenKind::Eof) {
            return Err(self.cursor.unexpected("end of input"));
        }

        let mut dataset = Dataset::new(name);
        for var in members {
            dataset.add(var);
        }
        Ok(dataset)
    }

    /// Parses declarations up to and including the closing `}`.
    fn parse_members(&mut self, open: Span) -> Result<Vec<Variable>> {
        let mut members = Vec::new();
        loop {
            if self.cursor.at(&TokenKind::RBrace) {
                self.cursor.advance();
                return Ok(members);
            }
            if self.cursor.at(&TokenKind::Eof) {
                return Err(self.cursor.error_at(open, "unbalanced '{': missing '}'"));
            }
            members.push(self.parse_decl()?);
        }
    }

    fn parse_decl(&mut self) -> Result<Variable> {
        let (keyword, span) = self.cursor.expect_ident("a type keyword")?;
        let kind = TypeKind::from_keyword(&keyword)
            .filter(|k| *k != TypeKind::Array)
            .ok_or_else(|| self.cursor.error_at(span, &format!("unknown type '{keyword}'")))?;

        let mut var = if kind.is_constructor() {
            let open = self.cursor.expect(&TokenKind::LBrace)?;
            let members = self.parse_members(open)?;
            let (name, _) = self.cursor.expect_ident("a variable name")?;
            let mut var = if kind == TypeKind::Record {
                Variable::record(name)
            } else {
                Variable::table(name)
            };
            for member in members {
                var.add_child(member, None)?;
            }
            var
        } else {
            let (name, _) = self.cursor.expect_ident("a variable name")?;
            Variable::scalar_of(name, kind)?
        };

        let dims = self.parse_dimensions()?;
        if !dims.is_empty() {
            if kind == TypeKind::Table {
                return Err(self.cursor.error_at(span, "a Sequence cannot have dimensions"));
            }
            let mut array = Variable::array(var.name().to_string(), var);
            if let Some(a) = array.as_array_mut() {
                for (size, name, at) in dims {
                    a.append_dimension(size, &name)
                        .map_err(|e| self.cursor.error_at(at, &e.to_string()))?;
                }
            }
            var = array;
        }

        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(var)
    }

    /// Parses `[name = size]` or `[size]` groups; names stay escaped.
    fn parse_dimensions(&mut self) -> Result<Vec<(usize, String, Span)>> {
        let mut dims = Vec::new();
        while self.cursor.at(&TokenKind::LBracket) {
            let open = self.cursor.expect(&TokenKind::LBracket)?;
            let mut name = String::new();
            if let TokenKind::Ident(raw) = &self.cursor.current.kind {
                name = raw.clone();
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Op(dapstream_foundation::RelOp::Equal))?;
            }
            let size = match self.cursor.current.kind {
                TokenKind::Integer(n) => usize::try_from(n)
                    .map_err(|_| self.cursor.error("dimension size must be non-negative"))?,
                _ => return Err(self.cursor.unexpected("a dimension size")),
            };
            self.cursor.advance();
            if self.cursor.at(&TokenKind::Eof) {
                return Err(self.cursor.error_at(open, "unbalanced '[': missing ']'"));
            }
            self.cursor.expect(&TokenKind::RBracket)?;
            dims.push((size, name, open));
        }
        Ok(dims)
    }
}

/// Parses declaration text into a dataset.
///
/// # Errors
/// Returns a parse error for malformed text.
pub fn parse_declaration(source: &str) -> Result<Dataset> {
    DeclarationParser::new(source).parse()
}
