//! Parsed constraint expressions.
//!
//! The parser only checks shape. Whether paths and functions exist is
//! decided when the expression is bound to a dataset.

use dapstream_foundation::RelOp;

use crate::span::Span;

/// A whole constraint: what to send and which rows to keep.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Constraint {
    /// Comma-separated items before the first `&`. Empty means everything.
    pub projection: Vec<ProjectionItem>,
    /// `&`-separated predicates, all of which must hold.
    pub selection: Vec<SelectionItem>,
}

impl Constraint {
    /// True for the empty expression.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projection.is_empty() && self.selection.is_empty()
    }
}

/// One projected variable or projection-function call.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionItem {
    /// A variable path with optional per-dimension slices.
    Path {
        /// Unescaped dotted path.
        path: String,
        /// One slice per leading dimension.
        slices: Vec<Slice>,
        /// Where the item was written.
        span: Span,
    },
    /// A function call.
    Call(Call),
}

/// `[start:stride:stop]` over one dimension, `stop` inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slice {
    /// First index.
    pub start: usize,
    /// Step.
    pub stride: usize,
    /// Last index.
    pub stop: usize,
}

impl Slice {
    /// A single index.
    #[must_use]
    pub const fn index(i: usize) -> Self {
        Self {
            start: i,
            stride: 1,
            stop: i,
        }
    }
}

/// One selection predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionItem {
    /// `lhs op rhs` or `lhs op {rhs, rhs, ...}`; any right-hand match suffices.
    Relation {
        /// Operator.
        op: RelOp,
        /// Left operand.
        lhs: Operand,
        /// Right operands, combined with OR.
        rhs: Vec<Operand>,
        /// Where the predicate was written.
        span: Span,
    },
    /// A boolean function call.
    Call(Call),
}

/// `name(arg, ...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    /// Function name.
    pub name: String,
    /// Arguments in order.
    pub args: Vec<Operand>,
    /// Where the call was written.
    pub span: Span,
}

/// A value-producing operand.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// A variable path, unescaped.
    Path(String, Span),
    /// An integer literal.
    Integer(i128, Span),
    /// A decimal literal.
    Float(f64, Span),
    /// A quoted string.
    Str(String, Span),
    /// A nested function call.
    Call(Call),
}

impl Operand {
    /// Where the operand was written.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Path(_, span) | Self::Integer(_, span) | Self::Float(_, span) | Self::Str(_, span) => {
                *span
            }
            Self::Call(call) => call.span,
        }
    }
}
