//! Server-side functions callable from constraint expressions.
//!
//! A registry is built once at startup and shared read-only by every
//! evaluator. Lookups are by exact name; the first registration wins.

use std::fmt;

use dapstream_foundation::{Error, RelOp, Result, Value};
use dapstream_language::Operand as ArgExpr;
use dapstream_model::{Body, Dataset, Variable};

/// A boolean function usable as a selection clause.
pub type PredicateFn = fn(&[&Variable], &Dataset) -> Result<bool>;

/// A value-producing function. `Ok(None)` means the function declined.
pub type ValueFn = fn(&[&Variable], &Dataset) -> Result<Option<Variable>>;

/// A projection function, run against the dataset when a constraint is bound.
pub type ProjectionFn = fn(&[ArgExpr], &mut Dataset) -> Result<()>;

/// A registered function.
#[derive(Clone, Copy)]
pub enum Function {
    /// Usable as a selection clause.
    Predicate(PredicateFn),
    /// Usable as an operand or as a functional expression.
    Value(ValueFn),
    /// Usable in the projection list.
    Projection(ProjectionFn),
}

impl Function {
    /// `"predicate"`, `"value"` or `"projection"`.
    #[must_use]
    pub const fn role(&self) -> &'static str {
        match self {
            Self::Predicate(_) => "predicate",
            Self::Value(_) => "value",
            Self::Projection(_) => "projection",
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.role())
    }
}

/// Name to function catalog.
#[derive(Clone, Debug, Default)]
pub struct FunctionRegistry {
    entries: Vec<(String, Function)>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in functions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("match", Function::Predicate(builtin_match));
        registry.register("length", Function::Value(builtin_length));
        registry.register("version", Function::Value(builtin_version));
        registry.register("select", Function::Projection(builtin_select));
        registry
    }

    /// Adds a function. An earlier registration under the same name shadows it.
    pub fn register(&mut self, name: impl Into<String>, function: Function) {
        self.entries.push((name.into(), function));
    }

    /// Finds a function by exact name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Function> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| *f)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

fn expect_args(name: &str, args: &[&Variable], count: usize) -> Result<()> {
    if args.len() == count {
        Ok(())
    } else {
        Err(Error::internal(format!(
            "{name}() takes {count} argument(s), got {}",
            args.len()
        )))
    }
}

/// `match(var, pattern)`: regular-expression match on a text variable.
fn builtin_match(args: &[&Variable], _dataset: &Dataset) -> Result<bool> {
    expect_args("match", args, 2)?;
    args[0].compare(args[1], RelOp::Regexp)
}

/// `length(var)`: constrained length of an array or a counted table.
fn builtin_length(args: &[&Variable], _dataset: &Dataset) -> Result<Option<Variable>> {
    expect_args("length", args, 1)?;
    let length = match args[0].body() {
        Body::Array(array) => array.length(),
        Body::Table(table) => table.length(),
        Body::Scalar(_) | Body::Record(_) => None,
    };
    Ok(length
        .and_then(|n| i32::try_from(n).ok())
        .map(|n| Variable::with_value("length", Value::Int32(n))))
}

/// `version()`: the engine version.
fn builtin_version(args: &[&Variable], _dataset: &Dataset) -> Result<Option<Variable>> {
    expect_args("version", args, 0)?;
    Ok(Some(Variable::with_value(
        "version",
        Value::Str(env!("CARGO_PKG_VERSION").to_string()),
    )))
}

/// `select(path, ...)`: marks each path for transmission.
fn builtin_select(args: &[ArgExpr], dataset: &mut Dataset) -> Result<()> {
    for arg in args {
        match arg {
            ArgExpr::Path(path, _) => dataset.mark(path, true)?,
            other => {
                return Err(Error::internal(format!(
                    "select() takes variable names, got {other:?}"
                )));
            }
        }
    }
    Ok(())
}
