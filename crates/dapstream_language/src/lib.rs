//! Lexer and parsers for dapstream request text.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization shared by both grammars
//! - [`parse_constraint`] - Constraint expressions into an [`ast::Constraint`]
//! - [`parse_declaration`] - Declaration text into a [`dapstream_model::Dataset`]
//!
//! Parse errors carry the line, column and source line of the problem.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod constraint;
mod cursor;
pub mod declaration;
pub mod lexer;
pub mod span;
pub mod token;

pub use ast::{Call, Constraint, Operand, ProjectionItem, SelectionItem, Slice};
pub use constraint::{ConstraintParser, parse_constraint};
pub use declaration::{DeclarationParser, parse_declaration};
pub use lexer::Lexer;
pub use span::Span;
pub use token::{Token, TokenKind};
