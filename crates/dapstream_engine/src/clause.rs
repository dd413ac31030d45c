//! Bound clauses: parsed expressions resolved against a registry.

use std::fmt;

use dapstream_foundation::RelOp;

use crate::functions::{PredicateFn, ValueFn};

/// Handle to a constant held by an [`crate::Evaluator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConstantId(pub(crate) usize);

impl ConstantId {
    /// Position in the evaluator's constant pool.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Something that yields a variable when a clause is evaluated.
#[derive(Clone)]
pub enum Operand {
    /// A dataset variable by dotted path, read at its current value.
    Variable(String),
    /// A literal from the evaluator's constant pool.
    Constant(ConstantId),
    /// A value function applied to operands.
    Call {
        /// Function name.
        name: String,
        /// The function.
        func: ValueFn,
        /// Arguments.
        args: Vec<Operand>,
    },
}

impl Operand {
    /// Appends every variable path this operand reads.
    pub fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Variable(path) => out.push(path),
            Self::Constant(_) => {}
            Self::Call { args, .. } => args.iter().for_each(|a| a.collect_paths(out)),
        }
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(path) => write!(f, "Variable({path})"),
            Self::Constant(id) => write!(f, "Constant({})", id.0),
            Self::Call { name, args, .. } => write!(f, "Call({name}, {args:?})"),
        }
    }
}

/// One unit of a constraint expression.
#[derive(Clone)]
pub enum Clause {
    /// `lhs op rhs[0] OR lhs op rhs[1] ...`
    Relational {
        /// Operator.
        op: RelOp,
        /// Left operand.
        lhs: Operand,
        /// Right operands; the clause holds if any comparison does.
        rhs: Vec<Operand>,
    },
    /// A boolean function.
    Predicate {
        /// Function name.
        name: String,
        /// The function.
        func: PredicateFn,
        /// Arguments.
        args: Vec<Operand>,
    },
    /// A value function whose result is the whole response.
    Value {
        /// Function name.
        name: String,
        /// The function.
        func: ValueFn,
        /// Arguments.
        args: Vec<Operand>,
    },
}

impl Clause {
    /// True for relational and predicate clauses.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Relational { .. } | Self::Predicate { .. })
    }

    /// Every variable path the clause reads.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        match self {
            Self::Relational { lhs, rhs, .. } => {
                lhs.collect_paths(&mut out);
                rhs.iter().for_each(|o| o.collect_paths(&mut out));
            }
            Self::Predicate { args, .. } | Self::Value { args, .. } => {
                args.iter().for_each(|o| o.collect_paths(&mut out));
            }
        }
        out
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relational { op, lhs, rhs } => {
                write!(f, "Relational({lhs:?} {} {rhs:?})", op.symbol())
            }
            Self::Predicate { name, args, .. } => write!(f, "Predicate({name}, {args:?})"),
            Self::Value { name, args, .. } => write!(f, "Value({name}, {args:?})"),
        }
    }
}
