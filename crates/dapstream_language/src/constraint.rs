//! Parser for constraint expressions.
//!
//! ```text
//! constraint := projection? ( '&' selection )*
//! projection := proj_item ( ',' proj_item )*
//! proj_item  := path slice* | call
//! slice      := '[' int ( ':' int ( ':' int )? )? ']'
//! selection  := operand relop rvalue | call
//! rvalue     := operand | '{' operand ( ',' operand )* '}'
//! operand    := path | number | string | call
//! call       := ident '(' ( operand ( ',' operand )* )? ')'
//! ```

use dapstream_foundation::Result;

use crate::ast::{Call, Constraint, Operand, ProjectionItem, SelectionItem, Slice};
use crate::cursor::Cursor;
use crate::span::Span;
use crate::token::TokenKind;

/// Parser for one constraint expression.
pub struct ConstraintParser<'src> {
    cursor: Cursor<'src>,
}

impl<'src> ConstraintParser<'src> {
    /// Creates a parser over `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Parses the whole input.
    ///
    /// # Errors
    /// Returns a parse error with line, column and source line for
    /// malformed input.
    pub fn parse(&mut self) -> Result<Constraint> {
        let mut constraint = Constraint::default();

        if !self.cursor.at(&TokenKind::Eof) && !self.cursor.at(&TokenKind::Ampersand) {
            constraint.projection.push(self.parse_projection_item()?);
            while self.cursor.at(&TokenKind::Comma) {
                self.cursor.advance();
                constraint.projection.push(self.parse_projection_item()?);
            }
        }

        while self.cursor.at(&TokenKind::Ampersand) {
            self.cursor.advance();
            constraint.selection.push(self.parse_selection()?);
        }

        if !self.cursor.at(&TokenKind::Eof) {
            return Err(self.cursor.unexpected("',' or '&'"));
        }
        Ok(constraint)
    }

    fn parse_projection_item(&mut self) -> Result<ProjectionItem> {
        let (name, span) = self.cursor.expect_ident("a variable or function")?;
        if self.cursor.at(&TokenKind::LParen) {
            return Ok(ProjectionItem::Call(self.parse_call_args(name, span)?));
        }
        let mut slices = Vec::new();
        let mut end = span;
        while self.cursor.at(&TokenKind::LBracket) {
            let (slice, slice_span) = self.parse_slice()?;
            slices.push(slice);
            end = slice_span;
        }
        Ok(ProjectionItem::Path {
            path: name,
            slices,
            span: span.to(end),
        })
    }

    fn parse_slice(&mut self) -> Result<(Slice, Span)> {
        let open = self.cursor.expect(&TokenKind::LBracket)?;
        let mut parts = vec![self.parse_index()?];
        while parts.len() < 3 && self.cursor.at(&TokenKind::Colon) {
            self.cursor.advance();
            parts.push(self.parse_index()?);
        }
        if !self.cursor.at(&TokenKind::RBracket) {
            if self.cursor.at(&TokenKind::Eof) {
                return Err(self.cursor.error_at(open, "unbalanced '[': missing ']'"));
            }
            return Err(self.cursor.unexpected("']'"));
        }
        let close = self.cursor.expect(&TokenKind::RBracket)?;

        let slice = match parts[..] {
            [i] => Slice::index(i),
            [start, stop] => Slice {
                start,
                stride: 1,
                stop,
            },
            [start, stride, stop] => Slice { start, stride, stop },
            _ => return Err(self.cursor.error_at(open, "malformed slice")),
        };
        if slice.stride == 0 {
            return Err(self.cursor.error_at(open, "slice stride must be at least 1"));
        }
        if slice.start > slice.stop {
            return Err(self.cursor.error_at(open, "slice start is past its stop"));
        }
        Ok((slice, open.to(close)))
    }

    fn parse_index(&mut self) -> Result<usize> {
        if let TokenKind::Integer(n) = self.cursor.current.kind {
            let index = usize::try_from(n)
                .map_err(|_| self.cursor.error("slice index must be a non-negative integer"))?;
            self.cursor.advance();
            Ok(index)
        } else {
            Err(self.cursor.unexpected("a slice index"))
        }
    }

    fn parse_selection(&mut self) -> Result<SelectionItem> {
        let lhs = self.parse_operand()?;
        if let TokenKind::Op(op) = self.cursor.current.kind {
            self.cursor.advance();
            let rhs = self.parse_rvalue()?;
            let end = rhs.last().map_or(lhs.span(), Operand::span);
            let span = lhs.span().to(end);
            return Ok(SelectionItem::Relation { op, lhs, rhs, span });
        }
        match lhs {
            Operand::Call(call) => Ok(SelectionItem::Call(call)),
            _ => Err(self.cursor.unexpected("a relational operator")),
        }
    }

    fn parse_rvalue(&mut self) -> Result<Vec<Operand>> {
        if !self.cursor.at(&TokenKind::LBrace) {
            return Ok(vec![self.parse_operand()?]);
        }
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let mut values = vec![self.parse_operand()?];
        while self.cursor.at(&TokenKind::Comma) {
            self.cursor.advance();
            values.push(self.parse_operand()?);
        }
        if self.cursor.at(&TokenKind::Eof) {
            return Err(self.cursor.error_at(open, "unbalanced '{': missing '}'"));
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(values)
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        let span = self.cursor.current.span;
        let operand = match &self.cursor.current.kind {
            TokenKind::Integer(n) => Operand::Integer(*n, span),
            TokenKind::Float(x) => Operand::Float(*x, span),
            TokenKind::Str(s) => Operand::Str(s.clone(), span),
            TokenKind::Ident(_) => {
                let (name, span) = self.cursor.expect_ident("an operand")?;
                if self.cursor.at(&TokenKind::LParen) {
                    return Ok(Operand::Call(self.parse_call_args(name, span)?));
                }
                return Ok(Operand::Path(name, span));
            }
            _ => return Err(self.cursor.unexpected("an operand")),
        };
        self.cursor.advance();
        Ok(operand)
    }

    fn parse_call_args(&mut self, name: String, start: Span) -> Result<Call> {
        let open = self.cursor.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.cursor.at(&TokenKind::RParen) {
            args.push(self.parse_operand()?);
            while self.cursor.at(&TokenKind::Comma) {
                self.cursor.advance();
                args.push(self.parse_operand()?);
            }
        }
        if self.cursor.at(&TokenKind::Eof) {
            return Err(self.cursor.error_at(open, "unbalanced '(': missing ')'"));
        }
        let close = self.cursor.expect(&TokenKind::RParen)?;
        Ok(Call {
            name,
            args,
            span: start.to(close),
        })
    }
}

/// Parses a constraint expression.
///
/// # Errors
/// Returns a parse error for malformed input.
pub fn parse_constraint(source: &str) -> Result<Constraint> {
    ConstraintParser::new(source).parse()
}
